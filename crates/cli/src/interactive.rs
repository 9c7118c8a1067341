use rustyline::DefaultEditor;

use ai_agent_transport::AppState;

pub async fn run(state: &AppState) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Agent Swarm CLI - Interactive Mode");
    println!("Type your query, or 'exit' to quit.");

    loop {
        let readline = rl.readline("ai> ");
        match readline {
            Ok(line) => {
                if line.trim() == "exit" {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                if let Err(err) = process_query(&line, state).await {
                    eprintln!("error: {err}");
                }
            }
            Err(_) => break,
        }
    }

    Ok(())
}

async fn process_query(query: &str, state: &AppState) -> anyhow::Result<()> {
    let response = state
        .adapter
        .call(&state.default_model_name, "You are a helpful assistant.", query, &state.memory)
        .await?;
    println!("{response}");
    Ok(())
}
