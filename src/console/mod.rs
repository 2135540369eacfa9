//! Interactive console
//!
//! Menu-driven front end over the tool registry. Input and output are
//! generic so the loop can run against stdin/stdout or in-memory buffers.

use crate::error::Result;
use crate::tools::{result_text, ToolRegistry};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const MENU: &str = "\n=== OpenAPI Tools ===\n\
1. List Categories\n\
2. List Endpoints\n\
3. Show Endpoint Details\n\
4. Get Spec Info\n\
5. Show Schema Details\n\
6. Exit\n\
\nSelect a tool (1-6): ";

/// Run the console against stdin and stdout until the user exits.
pub async fn run_interactive(registry: &ToolRegistry) -> Result<()> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    run_console(registry, input, output).await
}

/// Run the menu loop until option 6 is chosen or the input ends.
pub async fn run_console<R, W>(registry: &ToolRegistry, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut console = Console { input, output };

    loop {
        console.write(MENU).await?;
        let Some(choice) = console.read_line().await? else {
            break;
        };

        let (tool, arguments) = match choice.as_str() {
            "1" => ("list_categories", json!({})),
            "2" => {
                let category = console
                    .prompt("Enter category (or press Enter for all): ")
                    .await?;
                let arguments = if category.is_empty() {
                    json!({})
                } else {
                    json!({ "category": category })
                };
                ("list_endpoints", arguments)
            }
            "3" => {
                let path = console.prompt("Enter path (e.g., /users/{id}): ").await?;
                let method = console
                    .prompt("Enter method (GET, POST, PUT, DELETE, etc.): ")
                    .await?;
                ("show_endpoint", json!({ "path": path, "method": method }))
            }
            "4" => ("get_spec_info", json!({})),
            "5" => {
                let reference = console
                    .prompt("Enter schema reference (e.g., #/components/schemas/User): ")
                    .await?;
                ("show_schema", json!({ "ref": reference }))
            }
            "6" => {
                console.write("Exiting...\n").await?;
                break;
            }
            _ => {
                console.write("Invalid choice. Please select 1-6.\n").await?;
                continue;
            }
        };

        console.run_tool(registry, tool, arguments).await?;
    }

    console.output.flush().await?;
    Ok(())
}

struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Next trimmed line, `None` at end of input.
    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// End of input while prompting reads as an empty answer.
    async fn prompt(&mut self, question: &str) -> Result<String> {
        self.write(question).await?;
        Ok(self.read_line().await?.unwrap_or_default())
    }

    async fn run_tool(&mut self, registry: &ToolRegistry, tool: &str, arguments: Value) -> Result<()> {
        let text = match registry.execute_tool(tool, arguments).await {
            Ok(result) => format!("\n{}\n", result_text(&result)),
            Err(e) => format!("\nError: {e}\n"),
        };
        self.write(&text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{parse_spec, SpecExplorer};
    use std::sync::Arc;

    const SPEC: &str = r"
openapi: 3.0.3
info:
  title: Console
  version: '1.0'
paths:
  /pets:
    get:
      summary: List pets
      responses:
        '200':
          description: ok
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
";

    async fn run(script: &str) -> String {
        let explorer = Arc::new(SpecExplorer::new(parse_spec(SPEC.as_bytes()).unwrap()));
        let registry = crate::tools::create_default_registry(&explorer);
        let mut output = Vec::new();
        run_console(&registry, script.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_exit_option() {
        let output = run("6\n").await;
        assert!(output.contains("=== OpenAPI Tools ==="));
        assert!(output.contains("Select a tool (1-6): "));
        assert!(output.ends_with("Exiting...\n"));
    }

    #[tokio::test]
    async fn test_end_of_input_stops_the_loop() {
        let output = run("").await;
        assert_eq!(output.matches("=== OpenAPI Tools ===").count(), 1);
        assert!(!output.contains("Exiting..."));
    }

    #[tokio::test]
    async fn test_invalid_choice() {
        let output = run("9\n6\n").await;
        assert!(output.contains("Invalid choice. Please select 1-6."));
    }

    #[tokio::test]
    async fn test_list_categories() {
        let output = run("1\n6\n").await;
        assert!(output.contains("\"name\": \"pets\""));
        assert!(output.contains("\"endpoint_count\": 1"));
    }

    #[tokio::test]
    async fn test_prompts_and_errors() {
        let output = run("3\n/missing\nGET\n5\nPet\n6\n").await;
        assert!(output.contains("Enter path (e.g., /users/{id}): "));
        assert!(output.contains("Enter method (GET, POST, PUT, DELETE, etc.): "));
        assert!(output.contains("Error: "));
        assert!(output.contains("Path not found: /missing"));
        assert!(output.contains("Enter schema reference (e.g., #/components/schemas/User): "));
    }

    #[tokio::test]
    async fn test_show_schema() {
        let output = run("5\n#/components/schemas/Pet\n6\n").await;
        assert!(output.contains("\"name\": \"Pet\""));
    }
}
