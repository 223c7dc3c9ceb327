use dialoguer::Input;

use crate::error::{AppError, AppResult};

pub fn prompt_api_key() -> AppResult<String> {
    let key: String = Input::new()
        .with_prompt("Please enter your API key")
        .interact_text()
        .map_err(|error| AppError::Config(format!("api key prompt failed: {error}")))?;
    Ok(key.trim().to_owned())
}
