use std::fs;
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::fs as async_fs;
use tracing::{info, warn};

use crate::config::{Config, TranscriberEngine};
use crate::error::{Result, CapgenError};
use crate::media::MediaProcessorFactory;
use crate::transcribe::TranscriberFactory;

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub struct SetupManager {
    client: Client,
    app_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub size_mb: f64,
}

/// Outcome of one doctor check
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

impl SetupManager {
    pub fn new() -> Result<Self> {
        let app_dir = PathBuf::from(".capgen");

        fs::create_dir_all(app_dir.join("models"))?;

        let client = Client::builder()
            .user_agent("capgen/0.1.0")
            .build()
            .map_err(CapgenError::Http)?;

        Ok(Self { client, app_dir })
    }

    /// Make sure the configured whisper.cpp model is available locally,
    /// downloading it if needed, and rewrite the config entry to the file
    /// path. The OpenAI engine manages its own model files.
    pub async fn ensure_model(&self, config: &mut Config) -> Result<()> {
        if config.transcriber.engine != TranscriberEngine::WhisperCpp {
            return Ok(());
        }

        if self.model_exists(&config.transcriber.model) {
            config.transcriber.model = self.resolve_model_path(&config.transcriber.model);
            return Ok(());
        }

        info!("Model not found locally: {}", config.transcriber.model);
        let model = self.select_model(&config.transcriber.model)?;
        config.transcriber.model = self.download_model(&model).await?;
        Ok(())
    }

    pub fn available_models(&self) -> Vec<ModelInfo> {
        let catalog: [(&str, f64); 10] = [
            ("tiny", 39.0),
            ("tiny.en", 39.0),
            ("base", 142.0),
            ("base.en", 142.0),
            ("small", 244.0),
            ("small.en", 244.0),
            ("medium", 769.0),
            ("medium.en", 769.0),
            ("large-v2", 1550.0),
            ("large-v3", 1550.0),
        ];

        catalog
            .iter()
            .map(|(name, size_mb)| {
                let filename = format!("ggml-{}.bin", name);
                ModelInfo {
                    name: name.to_string(),
                    url: format!("{}/{}", MODEL_BASE_URL, filename),
                    filename,
                    size_mb: *size_mb,
                }
            })
            .collect()
    }

    fn select_model(&self, preferred: &str) -> Result<ModelInfo> {
        let models = self.available_models();

        // "large" means the newest large checkpoint
        let wanted = if preferred == "large" { "large-v3" } else { preferred };

        if let Some(model) = models.iter().find(|m| m.name == wanted) {
            return Ok(model.clone());
        }

        if let Some(model) = models.iter().find(|m| m.name == "base") {
            warn!("Model '{}' not in the catalog, using 'base' instead", preferred);
            return Ok(model.clone());
        }

        Err(CapgenError::Config(format!(
            "No suitable whisper model found for '{}'",
            preferred
        )))
    }

    pub fn model_exists(&self, model: &str) -> bool {
        // Explicit path to a model file
        let as_path = Path::new(model);
        if (as_path.is_absolute() || model.ends_with(".bin")) && as_path.exists() {
            return true;
        }

        // Catalog name resolved against the models directory
        if !model.contains('/') {
            return Path::new(&self.resolve_model_path(model)).exists();
        }

        false
    }

    /// Resolve a model name to its file path under the models directory.
    /// Paths are returned untouched.
    pub fn resolve_model_path(&self, model: &str) -> String {
        if model.contains('/') || model.ends_with(".bin") {
            return model.to_string();
        }

        let name = if model == "large" { "large-v3" } else { model };
        self.models_dir()
            .join(format!("ggml-{}.bin", name))
            .to_string_lossy()
            .to_string()
    }

    pub async fn download_model(&self, model: &ModelInfo) -> Result<String> {
        let local_path = self.models_dir().join(&model.filename);

        if local_path.exists() {
            info!("Model {} already exists at {}", model.name, local_path.display());
            return Ok(local_path.to_string_lossy().to_string());
        }

        info!("Downloading {} model ({:.1} MB)...", model.name, model.size_mb);

        let pb = ProgressBar::new((model.size_mb * 1_000_000.0) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );

        let response = self.client.get(&model.url).send().await.map_err(CapgenError::Http)?;

        if !response.status().is_success() {
            return Err(CapgenError::Config(format!(
                "Failed to download model {}: HTTP {}",
                model.name,
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            pb.set_length(content_length);
        }

        let temp_path = local_path.with_extension("tmp");
        let bytes = response.bytes().await.map_err(CapgenError::Http)?;
        pb.set_position(bytes.len() as u64);

        async_fs::write(&temp_path, &bytes).await?;
        async_fs::rename(&temp_path, &local_path).await?;

        pb.finish_with_message(format!("Downloaded {}", model.name));
        info!("Successfully downloaded {} to {}", model.name, local_path.display());

        Ok(local_path.to_string_lossy().to_string())
    }

    pub fn app_dir(&self) -> &PathBuf {
        &self.app_dir
    }

    pub fn models_dir(&self) -> PathBuf {
        self.app_dir.join("models")
    }

    /// Dependency checks behind the doctor command: external binaries,
    /// model availability, working directories.
    pub async fn run_diagnostics(&self, config: &Config) -> Vec<CheckReport> {
        let mut reports = Vec::new();

        let media = MediaProcessorFactory::create_processor(config.media.clone());
        reports.push(match media.get_version_info().await {
            Ok(version) => CheckReport {
                name: "ffmpeg".to_string(),
                ok: true,
                detail: version,
            },
            Err(e) => CheckReport {
                name: "ffmpeg".to_string(),
                ok: false,
                detail: format!("{} (install ffmpeg and ensure it is on PATH)", e),
            },
        });

        let transcriber = TranscriberFactory::create(config.transcriber.clone());
        reports.push(match transcriber.check_availability() {
            Ok(()) => CheckReport {
                name: format!("transcriber ({})", transcriber.engine_name()),
                ok: true,
                detail: "available".to_string(),
            },
            Err(e) => CheckReport {
                name: format!("transcriber ({})", transcriber.engine_name()),
                ok: false,
                detail: e.to_string(),
            },
        });

        if config.transcriber.engine == TranscriberEngine::WhisperCpp {
            let model = &config.transcriber.model;
            reports.push(if self.model_exists(model) {
                CheckReport {
                    name: "whisper model".to_string(),
                    ok: true,
                    detail: self.resolve_model_path(model),
                }
            } else {
                CheckReport {
                    name: "whisper model".to_string(),
                    ok: false,
                    detail: format!("'{}' not downloaded (run: capgen models --download)", model),
                }
            });
        }

        reports.push(match config.storage.ensure_directories() {
            Ok(()) => CheckReport {
                name: "working directories".to_string(),
                ok: true,
                detail: format!(
                    "{}, {}, {}",
                    config.storage.video_dir.display(),
                    config.storage.audio_dir.display(),
                    config.storage.captions_dir.display()
                ),
            },
            Err(e) => CheckReport {
                name: "working directories".to_string(),
                ok: false,
                detail: e.to_string(),
            },
        });

        reports
    }
}
