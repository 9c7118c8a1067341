use ai_agent_transport::AppState;

pub async fn execute(query: &str, state: &AppState) -> anyhow::Result<()> {
    let response = state
        .adapter
        .call(&state.default_model_name, "You are a helpful assistant.", query, &state.memory)
        .await?;
    println!("{response}");
    Ok(())
}
