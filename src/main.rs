use std::path::PathBuf;
use std::sync::Arc;
use workspace_editor_shell_lib::services::{LogNotifier, TextBufferFactory};
use workspace_editor_shell_lib::{init_logging, load_config, Workbench};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("editor.toml"));
    let config = load_config(&config_path);

    let workbench = Workbench::connect(
        config,
        Arc::new(TextBufferFactory),
        Arc::new(LogNotifier),
    )?;

    let restored = workbench.start().await?;
    log::info!("Restored {} tab(s)", restored.len());
    for tab in workbench.tabs() {
        log::info!(
            "{} {} [{}px]{}",
            if tab.active { ">" } else { " " },
            tab.title,
            tab.width,
            if tab.dirty { " (modified)" } else { "" }
        );
    }

    workbench.shutdown()?;
    Ok(())
}
