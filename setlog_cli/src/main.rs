use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use setlog_core::log_store::{EXERCISE_LOG_FILE, ROUTINE_LOG_FILE};
use setlog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "setlog")]
#[command(about = "Track an in-progress strength workout set by set", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the workout in progress (default)
    Status,

    /// Start a workout from a routine day, replacing any unsaved one
    Start {
        /// Routine id (see `setlog routines`)
        #[arg(long)]
        routine: String,

        /// Day id within the routine
        #[arg(long)]
        day: String,

        /// Do not carry weights over from the last session
        #[arg(long)]
        no_prefill: bool,
    },

    /// Edit a set's weight, reps or RIR
    Set {
        exercise: String,
        /// Set number, starting at 1
        set: usize,
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        reps: Option<String>,
        #[arg(long)]
        rir: Option<String>,
    },

    /// Toggle a set between done and not done
    Done { exercise: String, set: usize },

    /// Add a set to an exercise, copying the last set's weight and reps
    AddSet { exercise: String },

    /// Remove a set from an exercise
    RemoveSet { exercise: String, set: usize },

    /// Focus an exercise
    Focus { exercise: String },

    /// Save the workout to the log and close it
    Finish,

    /// Discard the workout without saving
    Cancel,

    /// Show logged history for an exercise
    History {
        exercise: String,
        /// Number of sessions to show
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// List available routines
    Routines,

    /// Export the workout log to CSV
    Export {
        /// Output file (defaults to <data-dir>/export.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Paths of the files setlog keeps in its data directory
struct DataPaths {
    data_dir: PathBuf,
    routine_logs: PathBuf,
    exercise_logs: PathBuf,
}

impl DataPaths {
    fn new(data_dir: PathBuf) -> Self {
        Self {
            routine_logs: data_dir.join(ROUTINE_LOG_FILE),
            exercise_logs: data_dir.join(EXERCISE_LOG_FILE),
            data_dir,
        }
    }
}

type Store = WorkoutSessionStore<FileSessionStorage>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.verbose {
        setlog_core::logging::init_with("debug", config.logging.format);
    } else {
        setlog_core::logging::init(&config.logging);
    }

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let paths = DataPaths::new(data_dir);

    let mut store = WorkoutSessionStore::open(FileSessionStorage::in_dir(&paths.data_dir))
        .with_default_set_count(config.session.default_set_count);

    match cli.command {
        None | Some(Commands::Status) => {
            display_session(&store);
            Ok(())
        }
        Some(Commands::Start {
            routine,
            day,
            no_prefill,
        }) => cmd_start(&mut store, &paths, &config, &routine, &day, no_prefill),
        Some(Commands::Set {
            exercise,
            set,
            weight,
            reps,
            rir,
        }) => {
            let update = SetUpdate {
                weight: weight.map(EditableNumber::from),
                reps: reps.map(EditableNumber::from),
                rir: rir.map(EditableNumber::from),
                completed: None,
            };
            cmd_set(&mut store, &exercise, set, &update);
            Ok(())
        }
        Some(Commands::Done { exercise, set }) => {
            if let Some(set_id) = resolve_set(&store, &exercise, set) {
                store.toggle_set_complete(&exercise, set_id);
                display_session(&store);
            }
            Ok(())
        }
        Some(Commands::AddSet { exercise }) => {
            if require_exercise(&store, &exercise) {
                store.add_set(&exercise);
                display_session(&store);
            }
            Ok(())
        }
        Some(Commands::RemoveSet { exercise, set }) => {
            cmd_remove_set(&mut store, &exercise, set);
            Ok(())
        }
        Some(Commands::Focus { exercise }) => {
            if require_exercise(&store, &exercise) {
                store.set_active_exercise(&exercise);
                display_session(&store);
            }
            Ok(())
        }
        Some(Commands::Finish) => cmd_finish(&mut store, &paths),
        Some(Commands::Cancel) => {
            if store.is_in_progress() {
                store.cancel_workout();
                println!("Workout discarded.");
            } else {
                println!("No workout in progress.");
            }
            Ok(())
        }
        Some(Commands::History { exercise, limit }) => {
            cmd_history(&paths, &config, &exercise, limit)
        }
        Some(Commands::Routines) => cmd_routines(&paths.data_dir),
        Some(Commands::Export { out }) => {
            let out = out.unwrap_or_else(|| paths.data_dir.join("export.csv"));
            let logs = read_routine_logs(&paths.routine_logs)?;
            let rows = export_routine_logs(&logs, &out)?;
            println!("✓ Exported {} sets to {}", rows, out.display());
            Ok(())
        }
    }
}

fn load_catalog(data_dir: &Path) -> Result<RoutineCatalog> {
    let catalog = RoutineCatalog::load_or_default(data_dir)?;
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Routine validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid routines".into()));
    }
    Ok(catalog)
}

fn cmd_start(
    store: &mut Store,
    paths: &DataPaths,
    config: &Config,
    routine_id: &str,
    day_id: &str,
    no_prefill: bool,
) -> Result<()> {
    let catalog = load_catalog(&paths.data_dir)?;
    let (routine, day) = catalog.find_day(routine_id, day_id)?;

    // Read history up front so a failed read never replaces the running session
    let logs = if no_prefill {
        None
    } else {
        Some((
            read_exercise_logs(&paths.exercise_logs)?,
            read_routine_logs(&paths.routine_logs)?,
        ))
    };

    if store.is_in_progress() {
        eprintln!("Discarding unsaved workout in progress.");
    }

    store.start_workout(
        WorkoutSelection {
            routine_id: Some(routine.id.clone()),
            routine_title: Some(routine.title.clone()),
            day_id: Some(day.id.clone()),
            day_title: Some(day.title.clone()),
        },
        &day.exercises,
    );

    if let Some((direct, legacy)) = logs {
        let today = Local::now().date_naive();

        for exercise in &day.exercises {
            let history = ExerciseHistory::build(
                &exercise.id,
                &direct,
                &legacy,
                config.history.dedup_window(),
            );
            if let Some(sets) =
                history.prefill_for(exercise.sets, store.default_set_count(), today)
            {
                tracing::debug!("Pre-filled {} from last session", exercise.id);
                store.prefill_sets(&exercise.id, sets);
            }
        }
    }

    println!("✓ Started {} - {}", routine.title, day.title);
    display_session(store);
    Ok(())
}

fn cmd_set(store: &mut Store, exercise: &str, set: usize, update: &SetUpdate) {
    if update.is_empty() {
        eprintln!("Nothing to change - pass --weight, --reps or --rir.");
        return;
    }
    if let Some(set_id) = resolve_set(store, exercise, set) {
        store.update_set(exercise, set_id, update);
        display_session(store);
    }
}

fn cmd_remove_set(store: &mut Store, exercise: &str, set: usize) {
    let Some(set_id) = resolve_set(store, exercise, set) else {
        return;
    };

    // At least one set stays on every exercise
    let remaining = store.exercise(exercise).map_or(0, |e| e.sets.len());
    if remaining <= 1 {
        eprintln!("Cannot remove the last set of {}.", exercise);
        return;
    }

    store.remove_set(exercise, set_id);
    display_session(store);
}

fn cmd_finish(store: &mut Store, paths: &DataPaths) -> Result<()> {
    let mut sink = JsonlLogStore::new(&paths.routine_logs);

    match store.commit(&mut sink, Utc::now())? {
        CommitOutcome::Saved(log) => {
            let sets: usize = log.entries.iter().map(|e| e.sets.len()).sum();
            println!(
                "✓ Workout saved: {} exercises, {} sets",
                log.entries.len(),
                sets
            );
        }
        CommitOutcome::NothingToSave => {
            println!("Nothing to save - complete a set or enter weight/reps first.");
        }
        CommitOutcome::NoSession => {
            println!("No workout in progress.");
        }
    }
    Ok(())
}

fn cmd_history(paths: &DataPaths, config: &Config, exercise: &str, limit: usize) -> Result<()> {
    let direct = read_exercise_logs(&paths.exercise_logs)?;
    let legacy = read_routine_logs(&paths.routine_logs)?;
    let history = ExerciseHistory::build(exercise, &direct, &legacy, config.history.dedup_window());

    if history.is_empty() {
        println!("No history for {}.", exercise);
        return Ok(());
    }

    if history.logged_today() {
        println!("Already logged today.");
    }

    for log in history.entries().iter().take(limit) {
        let sets: Vec<String> = log
            .sets
            .iter()
            .map(|s| format!("{}x{}", s.weight, s.reps))
            .collect();
        println!(
            "  {}  {}",
            log.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            sets.join(", ")
        );
    }
    Ok(())
}

fn cmd_routines(data_dir: &Path) -> Result<()> {
    let catalog = load_catalog(data_dir)?;
    for routine in &catalog.routines {
        println!("{} ({})", routine.title, routine.id);
        for day in &routine.days {
            println!("  {} ({}) - {} exercises", day.title, day.id, day.exercises.len());
        }
    }
    Ok(())
}

/// Check that a workout is running and contains `exercise`
fn require_exercise(store: &Store, exercise: &str) -> bool {
    if !store.is_in_progress() {
        println!("No workout in progress.");
        return false;
    }
    if store.exercise(exercise).is_none() {
        eprintln!("No exercise {} in this workout.", exercise);
        return false;
    }
    true
}

/// Map a 1-based set number to its id
fn resolve_set(store: &Store, exercise: &str, number: usize) -> Option<SetId> {
    if !require_exercise(store, exercise) {
        return None;
    }
    let set_id = number
        .checked_sub(1)
        .and_then(|i| store.exercise(exercise)?.sets.get(i))
        .map(|s| s.id);
    if set_id.is_none() {
        eprintln!("No set {} for {}.", number, exercise);
    }
    set_id
}

fn display_session(store: &Store) {
    let Some(session) = store.session() else {
        println!("No workout in progress.");
        return;
    };

    let title = match (&session.routine_title, &session.day_title) {
        (Some(routine), Some(day)) => format!("{} - {}", routine, day),
        (Some(routine), None) => routine.clone(),
        _ => "Workout".to_string(),
    };
    let elapsed = Utc::now() - session.start_time;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");
    println!("  Started {} min ago", elapsed.num_minutes().max(0));

    for exercise in &session.exercises {
        let focus = if session.active_exercise_id.as_deref() == Some(exercise.id()) {
            "▶"
        } else {
            " "
        };
        println!();
        println!(
            "{} {} ({})  {}/{} sets  target {} x {}",
            focus,
            exercise.definition.name,
            exercise.id(),
            exercise.completed_count(),
            exercise.sets.len(),
            exercise.original_sets,
            exercise.definition.rep_range,
        );
        for (index, set) in exercise.sets.iter().enumerate() {
            println!("    {}", format_set(index + 1, set));
        }
    }
    println!();
}

fn format_set(number: usize, set: &SetEntry) -> String {
    let blank = |v: &EditableNumber| {
        if v.is_blank() {
            "-".to_string()
        } else {
            v.to_string()
        }
    };
    let mut line = format!("{}. {} x {}", number, blank(&set.weight), blank(&set.reps));
    if !set.rir.is_blank() {
        line.push_str(&format!(" @{}", set.rir));
    }
    if set.completed {
        line.push_str(" ✓");
    }
    line
}
