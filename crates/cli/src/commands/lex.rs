use std::path::Path;

use xtuml_core::lex;

use crate::{read_input, OutputFormat};

pub(crate) fn cmd_lex(file: &Path, output: OutputFormat, quiet: bool) {
    let text = read_input(file, output, quiet);
    let tokens = lex(&text);

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&tokens)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for token in &tokens {
                let flag = if token.is_string { "  (string)" } else { "" };
                println!("{:>6}  {:<8}  {}{}", token.index, format!("{:?}", token.kind), token.value, flag);
            }
            if !quiet {
                println!("{} token(s)", tokens.len());
            }
        }
    }
}
