use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use oppmap::app::{Action, Explorer};
use oppmap::config::Config;
use oppmap::filter::{Facet, FilterState};
use oppmap::loader::load_dataset;
use oppmap::model::{Complexity, Dataset, DatasetDoc};
use oppmap::report::{self, ExploreRow};
use oppmap::share::{self, Route, ShareState};
use oppmap::svg::write_svg_file;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore an opportunity map dataset", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the items matching the given filters
    Explore {
        /// data.json, index.html, site directory, .zip bundle or snapshot
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
        /// Start from a share link or hash
        #[arg(long, value_name = "HASH")]
        share: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the values available for each facet
    Facets {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
    },
    /// Show the detail panel of an item or workflow
    Show {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Render the mindmap to SVG
    Mindmap {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
        /// Restrict to one domain
        #[arg(long, value_name = "ID")]
        domain: Option<String>,
        /// Executive mode: primary items only
        #[arg(long)]
        exec: bool,
        #[arg(long, conflicts_with = "expand_all")]
        collapse_all: bool,
        #[arg(long)]
        expand_all: bool,
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<Utf8PathBuf>,
    },
    /// List workflows, with the detail of one of them
    Workflows {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
        /// Workflow to show in detail
        #[arg(long, value_name = "ID")]
        select: Option<String>,
    },
    /// Group opportunities into sequencing buckets
    Roadmap {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
    },
    /// Show the foundational capabilities
    Foundations {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
    },
    /// Build a share link from flags
    Share {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "overview", value_name = "ROUTE")]
        route: String,
        #[arg(long)]
        exec: bool,
        /// Focused domain
        #[arg(long, value_name = "ID")]
        focus: Option<String>,
        /// Base URL (defaults to the configured one)
        #[arg(long, value_name = "URL")]
        base: Option<String>,
    },
    /// Write a binary snapshot of a dataset for fast reloads
    Snapshot {
        #[arg(value_name = "DATA")]
        data: Utf8PathBuf,
        #[arg(value_name = "OUT")]
        out: Utf8PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Free-text search
    #[arg(short, long, value_name = "TEXT")]
    query: Option<String>,
    #[arg(long, value_name = "ID")]
    domain: Vec<String>,
    #[arg(long, value_name = "VALUE")]
    metric: Vec<String>,
    #[arg(long, value_name = "VALUE")]
    complexity: Vec<String>,
    #[arg(long, value_name = "VALUE")]
    pattern: Vec<String>,
    #[arg(long, value_name = "VALUE")]
    deployment: Vec<String>,
    /// Top opportunities only
    #[arg(long)]
    top: bool,
    /// Opportunity-level items only
    #[arg(long)]
    opportunities: bool,
}

impl FilterArgs {
    fn facet_values(&self) -> impl Iterator<Item = (Facet, &String)> {
        let groups = [
            (Facet::Category, &self.domain),
            (Facet::MetricType, &self.metric),
            (Facet::Complexity, &self.complexity),
            (Facet::Pattern, &self.pattern),
            (Facet::DeploymentHint, &self.deployment),
        ];
        groups
            .into_iter()
            .flat_map(|(facet, values)| values.iter().map(move |v| (facet, v)))
    }

    /// Actions that layer these flags over `current`. Facet values already
    /// selected stay selected.
    fn actions(&self, current: &FilterState) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(q) = &self.query {
            actions.push(Action::SetSearch(q.clone()));
        }
        actions.extend(
            self.facet_values()
                .filter(|(facet, v)| !current.facets.contains(*facet, v))
                .map(|(facet, v)| Action::ToggleFacet {
                    facet,
                    value: v.clone(),
                }),
        );
        if self.top {
            actions.push(Action::SetOnlyTop(true));
        }
        if self.opportunities {
            actions.push(Action::SetOnlyOpportunities(true));
        }
        actions
    }

    fn to_filter_state(&self) -> FilterState {
        let mut state = FilterState {
            search: self.query.clone().unwrap_or_default(),
            only_top: self.top,
            only_opportunities: self.opportunities,
            ..FilterState::default()
        };
        for (facet, v) in self.facet_values() {
            state.facets.set(facet, v, true);
        }
        state
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(path: &Utf8Path) -> Result<Dataset> {
    load_dataset(path).with_context(|| format!("Failed to load dataset from {}", path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Explore {
            data,
            share,
            filters,
            json,
        } => {
            let mut explorer = Explorer::new(load(&data)?, config);
            if let Some(link) = share {
                explorer.dispatch(Action::ApplyShare(link));
            }
            explorer.dispatch(Action::Navigate(Route::Explore));
            let actions = filters.actions(&explorer.state().filters);
            explorer.dispatch_all(actions);
            let rows: Vec<ExploreRow> = explorer.visible_items().into_iter().map(ExploreRow::from).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                let cells: Vec<Vec<String>> = rows.iter().map(|r| r.cells().to_vec()).collect();
                println!("{}", report::format_table(&ExploreRow::HEADERS, &cells));
                println!();
                println!("{} of {} items", rows.len(), explorer.dataset().usecases.len());
                println!("Share: {}", explorer.share_hash());
                println!("{}", explorer.dataset().meta.footer());
            }
        }
        Command::Facets { data } => {
            let explorer = Explorer::new(load(&data)?, config);
            let counts = explorer.category_counts();
            println!("{}:", Facet::Category.label());
            for d in &explorer.dataset().domains {
                println!("  {} ({})  [{}]", d.name, counts.get(&d.id).copied().unwrap_or(0), d.id);
            }
            for facet in Facet::ALL.into_iter().skip(1) {
                println!("{}:", facet.label());
                for v in explorer.facet_options().values(facet) {
                    let nonstandard = facet == Facet::Complexity
                        && Complexity::new(v).is_some_and(|c| !c.is_known());
                    if nonstandard {
                        println!("  {} (nonstandard)", v);
                    } else {
                        println!("  {}", v);
                    }
                }
            }
        }
        Command::Show { data, id } => {
            let mut explorer = Explorer::new(load(&data)?, config);
            let (title, action) = if let Some(item) = explorer.dataset().item(&id) {
                (item.display_name().to_string(), Action::OpenItem(id.clone()))
            } else if let Some(wf) = explorer.dataset().workflow(&id) {
                (wf.name.clone(), Action::OpenWorkflow(id.clone()))
            } else {
                bail!("No item or workflow with id '{}'", id);
            };
            explorer.dispatch(action);
            println!("{}", title);
            println!("{}", "=".repeat(title.chars().count()));
            println!("{}", report::format_rows(&explorer.panel_rows()));
            if let Some(item) = explorer.open_item() {
                println!();
                println!("Quantified claims (as stated)");
                let claims = report::claim_rows(item);
                if claims.is_empty() {
                    println!("{}", report::NO_CLAIMS);
                } else {
                    println!("{}", report::format_table(&["Value", "Context"], &claims));
                }
            }
        }
        Command::Mindmap {
            data,
            domain,
            exec,
            collapse_all,
            expand_all,
            output,
        } => {
            let mut explorer = Explorer::new(load(&data)?, config);
            if let Some(id) = domain {
                if explorer.dataset().category(&id).is_none() {
                    bail!("No domain with id '{}'", id);
                }
                explorer.dispatch(Action::SelectCategory(Some(id)));
            }
            explorer.dispatch(Action::SetExecMode(exec));
            if collapse_all {
                explorer.dispatch(Action::CollapseAll);
            } else if expand_all {
                explorer.dispatch(Action::ExpandAll);
            }
            let markup = explorer.mindmap_svg();
            match output {
                Some(path) => {
                    write_svg_file(&path, &markup)?;
                    tracing::info!(%path, "mindmap written");
                }
                None => print!("{}", markup),
            }
        }
        Command::Workflows { data, select } => {
            let mut explorer = Explorer::new(load(&data)?, config);
            explorer.dispatch(Action::Navigate(Route::Workflows));
            if let Some(id) = select {
                if explorer.dataset().workflow(&id).is_none() {
                    bail!("No workflow with id '{}'", id);
                }
                explorer.dispatch(Action::SelectWorkflow(id));
            }
            let cells: Vec<Vec<String>> = explorer
                .workflow_list()
                .iter()
                .map(|r| r.cells().to_vec())
                .collect();
            println!("{}", report::format_table(&report::WorkflowRow::HEADERS, &cells));
            println!();
            match explorer.selected_workflow() {
                Some(wf) => {
                    println!("{}", wf.name);
                    println!("{}", "=".repeat(wf.name.chars().count()));
                    println!("{}", report::format_rows(&report::workflow_rows(wf)));
                }
                None => println!("{}", report::NO_WORKFLOW_SELECTED),
            }
            println!();
            println!("{}", explorer.dataset().meta.footer());
        }
        Command::Roadmap { data } => {
            let dataset = load(&data)?;
            for (bucket, items) in report::roadmap(&dataset) {
                println!("{} ({})", bucket.label(), items.len());
                for u in items {
                    println!(
                        "  {}  [{} quantified claims; TTV: {}; complexity: {}]",
                        u.display_name(),
                        u.quant_claim_count,
                        u.time_to_value.as_deref().unwrap_or(report::DASH),
                        u.complexity.as_ref().map_or(report::DASH, |c| c.as_str()),
                    );
                }
            }
            println!();
            println!("{}", dataset.meta.footer());
        }
        Command::Foundations { data } => {
            let dataset = load(&data)?;
            let (core, rest) = report::split_foundations(&dataset);
            for (title, group) in [("Core platform", core), ("Other capabilities", rest)] {
                if group.is_empty() {
                    continue;
                }
                println!("{}", title);
                for f in group {
                    println!("  {}: {}", f.area, report::or_not_stated(f.summary.as_deref()));
                }
            }
            for area in ["open-source-first reference stack", "self-hostable building blocks"] {
                let Some(f) = report::foundation_by_area(&dataset, area) else {
                    continue;
                };
                let Some(mut rows) = f.full_excerpt.as_deref().and_then(report::pipe_table) else {
                    continue;
                };
                let width = rows.iter().map(Vec::len).max().unwrap_or(0);
                for row in &mut rows {
                    row.resize(width, String::new());
                }
                let body = rows.split_off(1);
                let headers: Vec<&str> = rows.iter().flatten().map(String::as_str).collect();
                println!();
                println!("{}", f.area);
                println!("{}", report::format_table(&headers, &body));
            }
            println!();
            println!("{}", dataset.meta.footer());
        }
        Command::Share {
            filters,
            route,
            exec,
            focus,
            base,
        } => {
            let state = ShareState {
                route: route.parse()?,
                exec_mode: exec,
                filters: filters.to_filter_state(),
                selected_category: focus,
            };
            let base = base.unwrap_or(config.share.base_url);
            println!("{}", share::share_url(&base, &state));
        }
        Command::Snapshot { data, out } => {
            let dataset = load(&data)?;
            DatasetDoc { dataset }
                .save_to_binary(&out)
                .with_context(|| format!("Failed to write snapshot {}", out))?;
            println!("Snapshot written to {}", out);
        }
    }
    Ok(())
}
