use crate::app::engine::ReportSession;
use crate::config::{ViewConfig, load_config_from_path, load_layout_from_path};
use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "depview",
    version,
    about = "Aggregate, fold and filter the dependencies of an architecture report"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// View configuration JSON (type filter, folds, violations, node filters)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fold a node by full name (repeatable)
    #[arg(long = "fold", global = true)]
    pub fold: Vec<String>,

    /// Node name filter, e.g. "com.tngtech.pkg1*|~*Test"
    #[arg(long, global = true)]
    pub name_filter: Option<String>,

    /// Hide a dependency type: implements, extends, constructorCall, methodCall,
    /// fieldAccess, implementsAnonymous or innerClasses (repeatable)
    #[arg(long = "hide-type", global = true)]
    pub hide_type: Vec<String>,

    /// Show the report's violations of a rule (repeatable)
    #[arg(long = "violation-rule", global = true)]
    pub violation_rule: Vec<String>,

    /// Only show violating dependencies while violations are shown
    #[arg(long, global = true)]
    pub isolate_violations: bool,

    /// Only show nodes involved in shown violations
    #[arg(long, global = true)]
    pub hide_nodes_without_violations: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the visible dependencies
    Visible { report: PathBuf },
    /// Print the links driving the node layout
    Links { report: PathBuf },
    /// Print the detailed dependencies behind a displayed pair
    Details {
        report: PathBuf,
        from: String,
        to: String,
    },
    /// Print the nodes containing and involved in shown violations
    Violations { report: PathBuf },
    /// Print the endpoints of every visible dependency for a layout
    Positions {
        report: PathBuf,
        /// JSON object mapping node names to absolute circles {x, y, r}
        #[arg(long)]
        layout: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl Cli {
    /// The config file, if any, extended by the command line flags.
    pub fn effective_config(&self) -> Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from_path(path)?,
            None => ViewConfig::default(),
        };
        config.folded.extend(self.fold.iter().cloned());
        if let Some(name_filter) = &self.name_filter {
            config.node_name_filter = Some(name_filter.clone());
        }
        for type_name in &self.hide_type {
            if !config.type_filter.hide(type_name) {
                bail!("Unknown dependency type: {}", type_name);
            }
        }
        config.isolate_violations |= self.isolate_violations;
        config.hide_nodes_without_violations |= self.hide_nodes_without_violations;
        Ok(config)
    }

    fn report(&self) -> &Path {
        match &self.command {
            Commands::Visible { report }
            | Commands::Links { report }
            | Commands::Details { report, .. }
            | Commands::Violations { report }
            | Commands::Positions { report, .. } => report,
        }
    }

    pub fn open_session(&self) -> Result<ReportSession> {
        let config = self.effective_config()?;
        let mut session = ReportSession::load_from_json(self.report())?;
        session
            .apply_config(&config)
            .context("Failed to apply view configuration")?;
        for rule in &self.violation_rule {
            session.show_violations_of_rule(rule)?;
        }
        Ok(session)
    }
}

/// Runs the command and returns what is to be printed.
pub async fn run(cli: &Cli) -> Result<String> {
    let mut session = cli.open_session()?;
    session.settle().await;
    match &cli.command {
        Commands::Visible { .. } => {
            let response = session.visible();
            render(cli.format, &response, || {
                response
                    .dependencies
                    .iter()
                    .map(|d| {
                        let violation = if d.is_violation { " [violation]" } else { "" };
                        format!("{}->{}({}){}", d.from, d.to, d.description, violation)
                    })
                    .collect()
            })
        }
        Commands::Links { .. } => {
            let response = session.links();
            render(cli.format, &response, || {
                response
                    .links
                    .iter()
                    .map(|link| format!("{} -> {}", link.source, link.target))
                    .collect()
            })
        }
        Commands::Details { from, to, .. } => {
            let response = session.details(from, to);
            render(cli.format, &response, || {
                response
                    .details
                    .iter()
                    .map(|detail| format!("{} [{}]", detail.description, detail.css_class))
                    .collect()
            })
        }
        Commands::Violations { .. } => {
            let response = session.violations();
            render(cli.format, &response, || {
                let mut lines = vec![format!("rules: {}", response.rules.join(", "))];
                lines.push("nodes containing violations:".to_string());
                lines.extend(
                    response
                        .nodes_containing_violations
                        .iter()
                        .map(|name| format!("  {}", name)),
                );
                lines.push("nodes involved in visible violations:".to_string());
                lines.extend(
                    response
                        .nodes_involved_in_visible_violations
                        .iter()
                        .map(|name| format!("  {}", name)),
                );
                lines
            })
        }
        Commands::Positions { layout, .. } => {
            let layout = load_layout_from_path(layout)?;
            let unknown = session.apply_layout(&layout).await;
            let response = session.positions(unknown);
            render(cli.format, &response, || {
                response
                    .positions
                    .iter()
                    .map(|p| {
                        format!(
                            "{}->{}: ({:.2}, {:.2}) -> ({:.2}, {:.2}){}",
                            p.from,
                            p.to,
                            p.start_point.x,
                            p.start_point.y,
                            p.end_point.x,
                            p.end_point.y,
                            if p.is_visible { "" } else { " hidden" }
                        )
                    })
                    .collect()
            })
        }
    }
}

fn render<T: Serialize>(
    format: OutputFormat,
    response: &T,
    text_lines: impl FnOnce() -> Vec<String>,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(response).context("Failed to serialize output")
        }
        OutputFormat::Text => Ok(text_lines().join("\n")),
    }
}
