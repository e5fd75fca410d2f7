//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::error::Result;
use crate::output::Formatter;
use surveyup_convert::Converter;
use surveyup_domain::LlmProvider;

/// Execute the analyze command.
pub async fn execute_analyze<L: LlmProvider>(
    args: AnalyzeArgs,
    converter: &Converter<L>,
    formatter: &Formatter,
) -> Result<()> {
    let result = converter.convert_file(&args.input).await?;
    println!("{}", formatter.format_analysis(&result)?);
    Ok(())
}
