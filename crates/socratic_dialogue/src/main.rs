use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use dialogue_console::{init_logging, EnvConfig, Palette, ProcessConsole};
use socratic_dialogue::config::load_config;
use socratic_dialogue::engine::{DialogueContext, DialogueEngine};
use socratic_dialogue::providers;
use socratic_dialogue::startup::{print_config_banner, select_template, StartupPaths};

fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let env = EnvConfig::from_env();
    init_logging(&env).context("failed to initialise logging")?;
    if let Err(error) = dotenv {
        if !error.not_found() {
            tracing::warn!(%error, "failed to load .env");
        }
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    let _signals = dialogue_console::install_interrupt_handler(Arc::clone(&interrupt))
        .context("failed to install interrupt handlers")?;

    let palette = Palette::new(env.color_enabled());
    let mut console = ProcessConsole::new(Arc::clone(&interrupt));
    let paths = StartupPaths::from_env();

    let config = load_config(&paths.config)
        .with_context(|| format!("failed to load {}", paths.config.display()))?;
    print_config_banner(&mut console, &palette, &config, &paths.config)?;

    let provider = providers::provider_from_env(&config)?;
    let profile = provider.profile();
    tracing::info!(provider = %profile.provider_id, model = %profile.model_id, "provider ready");

    let Some(template) = select_template(&mut console, &paths.templates)? else {
        return Ok(());
    };

    let context = DialogueContext {
        config,
        template,
        provider,
        interrupt,
        palette,
    };
    let report = DialogueEngine::new(context, console).run()?;
    tracing::info!(
        lines = report.transcript.len(),
        saved = report.saved_to.is_some(),
        "dialogue finished"
    );

    Ok(())
}
