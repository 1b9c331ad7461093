//! systemd unit rendering.

use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};

use crate::config::ServerConfig;

const UNIT_TEMPLATE: &str = "\
[Unit]
Description=Factorio Server
After=network.target

[Service]
Type=simple
User={{ user }}
WorkingDirectory={{ working_directory }}
ExecStart={{ binary }} --start-server {{ save_path }}\
{% if settings_path %} --server-settings {{ settings_path }}{% endif %}

[Install]
WantedBy=multi-user.target
";

/// Render the unit definition for `config`.
///
/// The output depends only on the configuration, so rendering the same
/// configuration twice yields byte-identical text.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_unit(config: &ServerConfig) -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("user", &config.user);
    context.insert("working_directory", &config.factorio_path.display().to_string());
    context.insert("binary", &config.bin_path.display().to_string());
    context.insert("save_path", &config.save_path.display().to_string());
    context.insert(
        "settings_path",
        &config.settings_path.as_ref().map(|p| p.display().to_string()),
    );

    Tera::one_off(UNIT_TEMPLATE, &context, false)
        .with_context(|| format!("Failed to render unit for {}", config.service_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn config(settings: Option<&str>) -> ServerConfig {
        let mut content = String::from(
            "factorio-path = \"/opt/factorio\"\nsave-path = \"/opt/saves/fsave.zip\"\nuser = \"factorio\"\n",
        );
        if let Some(settings) = settings {
            content.push_str(&format!("settings-path = \"{settings}\"\n"));
        }
        ServerConfig::parse(&content, Path::new("/etc/faas"), Path::new("/etc/faas/config.toml"))
            .unwrap()
    }

    #[test]
    fn test_render_without_settings() {
        let unit = render_unit(&config(None)).unwrap();

        assert!(unit.starts_with("[Unit]\nDescription=Factorio Server\nAfter=network.target\n"));
        assert!(unit.contains("User=factorio\n"));
        assert!(unit.contains("WorkingDirectory=/opt/factorio\n"));
        assert!(unit.contains(
            "ExecStart=/opt/factorio/bin/x64/factorio --start-server /opt/saves/fsave.zip\n"
        ));
        assert!(!unit.contains("--server-settings"));
        assert!(unit.trim_end().ends_with("WantedBy=multi-user.target"));
    }

    #[test]
    fn test_render_with_settings() {
        let unit = render_unit(&config(Some("/opt/factorio/data/server-settings.json"))).unwrap();
        assert!(unit.contains(
            "--start-server /opt/saves/fsave.zip --server-settings /opt/factorio/data/server-settings.json\n"
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render_unit(&config(Some("settings.json"))).unwrap();
        let second = render_unit(&config(Some("settings.json"))).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert!(first.contains(&PathBuf::from("/etc/faas/settings.json").display().to_string()));
    }

    #[test]
    fn test_paths_are_not_escaped() {
        let mut config = config(None);
        config.save_path = PathBuf::from("/srv/saves/a&b's.zip");
        let unit = render_unit(&config).unwrap();
        assert!(unit.contains("--start-server /srv/saves/a&b's.zip"));
    }
}
