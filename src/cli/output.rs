//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, ScourArgs};
use crate::document::Document;
use crate::error::Result;

/// Result structure for document indexing.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// Result structure for search operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub documents: Vec<Document>,
    pub total_hits: usize,
    pub duration_ms: u64,
}

/// Index statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStats {
    pub data_dir: String,
    pub total_documents: u64,
    pub number_of_segments: usize,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &ScourArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &ScourArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;

    if std::any::type_name::<T>().ends_with("SearchResults") {
        output_search_results_human(&value)
    } else if std::any::type_name::<T>().ends_with("IndexStats") {
        output_index_stats_human(&value)
    } else {
        output_generic_human(&value)
    }
}

/// Output search results in human format.
fn output_search_results_human(value: &serde_json::Value) -> Result<()> {
    if let Some(obj) = value.as_object()
        && let Some(documents) = obj.get("documents").and_then(|d| d.as_array())
    {
        println!("Search Results:");
        println!("═══════════════");

        for (i, doc) in documents.iter().enumerate() {
            println!();
            println!("Result {}:", i + 1);
            println!("─────────────");

            if let Some(fields) = doc.as_object() {
                for (field_name, field_value) in fields {
                    println!("{field_name}: {}", format_value(field_value));
                }
            }
        }

        println!();

        if let Some(total) = obj.get("total_hits").and_then(|t| t.as_u64()) {
            println!("Total hits: {total}");
        }

        if let Some(duration) = obj.get("duration_ms").and_then(|d| d.as_u64()) {
            println!("Search time: {duration}ms");
        }
    }
    Ok(())
}

/// Output index statistics in human format.
fn output_index_stats_human(value: &serde_json::Value) -> Result<()> {
    if let Some(obj) = value.as_object() {
        println!("Index Statistics:");
        println!("════════════════");

        if let Some(dir) = obj.get("data_dir").and_then(|d| d.as_str()) {
            println!("Data directory: {dir}");
        }

        if let Some(docs) = obj.get("total_documents").and_then(|d| d.as_u64()) {
            println!("Total documents: {docs}");
        }

        if let Some(segments) = obj.get("number_of_segments").and_then(|s| s.as_u64()) {
            println!("Number of segments: {segments}");
        }
    }
    Ok(())
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ScourArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for human output.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
