//! Convert command implementation.

use crate::cli::ConvertArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::path::PathBuf;
use surveyup_convert::{default_output_path, Converter};
use surveyup_domain::LlmProvider;

/// Execute the convert command.
///
/// Returns the path of the written spreadsheet.
pub async fn execute_convert<L: LlmProvider>(
    args: ConvertArgs,
    converter: &Converter<L>,
    formatter: &Formatter,
) -> Result<PathBuf> {
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    println!(
        "{}",
        formatter.info(&format!(
            "Analyzing {} with {}",
            args.input.display(),
            converter.extractor().model_name()
        ))
    );

    let result = converter.convert_to_xlsx(&args.input, &output).await?;

    for failure in &result.failures {
        println!(
            "{}",
            formatter.warning(&format!(
                "Chunk {} skipped: {}",
                failure.chunk_index + 1,
                failure.reason
            ))
        );
    }

    println!(
        "{}",
        formatter.success(&format!(
            "Wrote {} question(s) to {}",
            result.survey.len(),
            output.display()
        ))
    );

    Ok(output)
}
