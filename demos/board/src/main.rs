//! Board example binary
//!
//! Builds (or loads) a board, renders its nested view through a store
//! observer, moves a task, and shows which column views were reused.
//!
//! ```bash
//! cargo run -p board-demo
//! cargo run -p board-demo -- --snapshot board.json --board 1 --json
//! RUST_LOG=composable_board_projections=trace cargo run -p board-demo -- --metrics
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use composable_board_core::{
    AddColumnParams, AddTaskParams, BoardAction, BoardEnvironment, BoardId, BoardParams,
    BoardReducer, EntityStore, MoveTaskParams,
};
use composable_board_projections::{BoardViews, NestedBoardView};
use composable_board_runtime::metrics::describe_metrics;
use composable_board_runtime::{BoardStore, Store, StoreConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "board-demo")]
#[command(author, version, about = "Memoized nested board views")]
struct Cli {
    /// JSON entity store to start from instead of the built-in sample
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Board to render (defaults to the lowest board id)
    #[arg(long)]
    board: Option<u64>,

    /// Print views as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Print recorded metrics in Prometheus text format before exiting
    #[arg(long)]
    metrics: bool,
}

/// Last board view each observer pass rendered
type Rendered = Arc<Mutex<Option<Arc<NestedBoardView>>>>;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_demo=info,composable_board_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let prometheus = if cli.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("installing the Prometheus recorder")?;
        describe_metrics();
        Some(handle)
    } else {
        None
    };

    let store = match &cli.snapshot {
        Some(path) => load_store(path)?,
        None => sample_store()?,
    };
    let snapshot = store.snapshot();
    let board_id = match cli.board {
        Some(id) => BoardId::new(id),
        None => match snapshot.board_ids().first() {
            Some(id) => *id,
            None => bail!("the store has no boards"),
        },
    };

    let views = Arc::new(BoardViews::new());
    store.attach_views(Arc::clone(&views));

    let rendered: Rendered = Arc::new(Mutex::new(None));
    {
        let views = Arc::clone(&views);
        let rendered = Arc::clone(&rendered);
        store.subscribe(move |snapshot| {
            let next = views.select_nested_board_by_id(snapshot, board_id);
            let mut last = rendered.lock().unwrap_or_else(PoisonError::into_inner);
            report_reuse(last.as_ref(), next.as_ref());
            *last = next;
        });
    }

    let Some(board) = views.select_nested_board_by_id(&snapshot, board_id) else {
        bail!("board {board_id} not found");
    };
    *rendered.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&board));

    print_board(&board, cli.json)?;
    for column in &board.columns {
        let list = views.select_position_list_of_column(&snapshot, column.id);
        println!("\nMove targets in {}:", column.title);
        for entry in list.iter() {
            println!("  {}", entry.label);
        }
    }
    let column_positions = views.select_column_positions_of_board(&snapshot, board_id);
    println!("\nColumn positions:");
    for entry in column_positions.iter() {
        println!("  {}", entry.label);
    }

    if let Some(action) = demo_move(&board) {
        println!("\n>>> Sending: {}", action.name());
        store.send(action)?;
        let latest = rendered.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(board) = latest {
            print_board(&board, cli.json)?;
        }
    }

    println!("\nView cache:");
    for stats in views.stats() {
        println!(
            "  {:<26} slots={:<3} hits={:<4} misses={:<4} hit_ratio={:.2}",
            stats.selector.as_str(),
            stats.slots,
            stats.hits,
            stats.misses,
            stats.hit_ratio()
        );
    }

    if let Some(handle) = prometheus {
        println!("\n{}", handle.render());
    }

    Ok(())
}

fn load_store(path: &Path) -> Result<BoardStore> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let entities: EntityStore = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!(
        boards = entities.board_count(),
        columns = entities.column_count(),
        tasks = entities.task_count(),
        "Snapshot loaded"
    );
    let env = BoardEnvironment::continuing(&entities);
    Ok(Store::with_config(entities, BoardReducer::new(), env, StoreConfig::default()))
}

/// One board with three columns built through the reducer
fn sample_store() -> Result<BoardStore> {
    let store = Store::new(EntityStore::new(), BoardReducer::new(), BoardEnvironment::sequential());

    store.send(BoardAction::AddBoard {
        params: BoardParams::new("Release 1.0"),
    })?;
    let board_id = store.state(|s| s.board_ids().first().copied()).context("sample board")?;

    for title in ["Todo", "Doing", "Done"] {
        store.send(BoardAction::AddColumn {
            board_id,
            params: AddColumnParams::new(title),
        })?;
    }
    let columns = store.state(|s| s.column_ids_of(&board_id).to_vec());

    let tasks: [(usize, &str, &str, Option<f64>); 5] = [
        (0, "Fix", "bug", None),
        (0, "Test", "feature", None),
        (0, "Triage", "bug", Some(1.0)),
        (1, "Review", "pull request", None),
        (2, "Ship", "release", None),
    ];
    for (column, title, name, position) in tasks {
        let params = AddTaskParams::new(title, name);
        let params = match position {
            Some(position) => params.at(position),
            None => params,
        };
        store.send(BoardAction::AddTask {
            column_id: columns[column],
            params,
        })?;
    }

    Ok(store)
}

/// Move the first task of the first column to the end of the last column
fn demo_move(board: &NestedBoardView) -> Option<BoardAction> {
    let source = board.columns.first()?;
    let target = board.columns.last()?;
    let task = source.tasks.first()?;
    let position = target.tasks.last().map_or(1.0, |t| t.position + 1.0);
    Some(BoardAction::MoveTask {
        task_id: task.id,
        params: MoveTaskParams {
            column_id: target.id,
            position,
        },
    })
}

fn report_reuse(previous: Option<&Arc<NestedBoardView>>, next: Option<&Arc<NestedBoardView>>) {
    match (previous, next) {
        (Some(previous), Some(next)) if Arc::ptr_eq(previous, next) => {
            tracing::info!("Board view unchanged");
        }
        (Some(previous), Some(next)) => {
            for column in &next.columns {
                let reused = previous
                    .column(column.id)
                    .is_some_and(|old| Arc::ptr_eq(old, column));
                tracing::info!(column = %column.title, reused, "Column view");
            }
        }
        (_, None) => tracing::info!("Board disappeared"),
        (None, Some(_)) => tracing::info!("Board appeared"),
    }
}

fn print_board(board: &NestedBoardView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(board)?);
        return Ok(());
    }

    println!("\n=== {} ({} tasks) ===", board.title, board.task_count());
    for column in &board.columns {
        println!("[{}] {}", column.position, column.title);
        for task in column.tasks.iter() {
            println!("    {}. {} ({})", task.position, task.title, task.name);
        }
    }
    Ok(())
}
