use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "wordpredict";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of words to recommend. Keep this small, below 10.
    pub recommendation_window: usize,
    pub max_edit_distance: u32,
    /// Context used for the first word of a typing session.
    pub sentence_start_token: String,
    pub model_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recommendation_window: 3,
            max_edit_distance: 2,
            sentence_start_token: ".".to_string(),
            model_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        match confy::load(APP_NAME, Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                log::warn!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, Some("config"), self)
    }

    /// The configured model path, or `<data dir>/wordpredict/model.txt`.
    pub fn resolved_model_path(&self) -> PathBuf {
        if let Some(path) = &self.model_path {
            return path.clone();
        }
        match dirs::data_dir() {
            Some(mut path) => {
                path.push(APP_NAME);
                path.push("model.txt");
                path
            }
            None => PathBuf::from("model.txt"),
        }
    }
}
