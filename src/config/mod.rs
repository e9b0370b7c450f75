use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::renderer::RenderSettings;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Project root: renderer working directory and location of job logs.
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Renderer executable.
    #[serde(default = "default_renderer_program")]
    pub renderer_program: PathBuf,

    /// Script handed to the renderer. Defaults to `<project>/scripts/process_one.py`.
    pub render_script: Option<PathBuf>,

    /// Where rendered videos land. Defaults to `<project>/output`.
    pub output_dir: Option<PathBuf>,

    /// Hard wall-clock limit per render, in seconds.
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_renderer_program() -> PathBuf {
    PathBuf::from("blender")
}

fn default_render_timeout_secs() -> u64 {
    1200
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join("output"))
    }

    pub fn static_dir(&self) -> PathBuf {
        self.project_dir.join("static")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.project_dir.join("data")
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            program: self.renderer_program.clone(),
            script: self
                .render_script
                .clone()
                .unwrap_or_else(|| self.project_dir.join("scripts").join("process_one.py")),
            project_dir: self.project_dir.clone(),
            output_dir: self.output_dir(),
            timeout: Duration::from_secs(self.render_timeout_secs),
        }
    }
}
