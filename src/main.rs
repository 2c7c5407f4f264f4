//! Lost File Finder - recovers lost or deleted Office documents on Windows
//!
//! Searches the Recycle Bin, every disk, Office autorecovery and temp folders,
//! the Windows "Recent Items" shortcuts and Volume Shadow Copies, then lets
//! the user copy a found file somewhere safe.
//!
//! Shadow copies are only readable with Administrator privileges.

mod aggregate;
mod config;
mod privilege;
mod prober;
mod process;
mod record;
mod recycle_bin;
mod report;
mod restore;
mod search;
mod shortcut;
mod vss;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colored::Colorize;
use signal_hook::consts::SIGINT;

use crate::config::{DocumentKind, RecoveryPaths, DEFAULT_LOG_FILTER, LOG_ENV_VAR, RECENT_DAYS};
use crate::process::SystemRunner;
use crate::record::FileRecord;
use crate::search::{
    run_backend, BackendOutcome, DiskByNameBackend, DiskRecentBackend, RecentItemsBackend,
    RecycleBinBackend, SearchBackend, SearchQuery, ShadowCopyBackend, TempFilesBackend,
};

const FAREWELL: &str = "Hasta luego!";
const INTERRUPT_POLL: Duration = Duration::from_millis(100);

struct Session {
    kind: DocumentKind,
    paths: RecoveryPaths,
}

impl Session {
    /// Every backend in the order a combined search runs them
    fn all_backends(&self) -> Vec<Box<dyn SearchBackend>> {
        vec![
            Box::new(RecycleBinBackend::new(SystemRunner)),
            Box::new(TempFilesBackend::new(self.paths.autorecovery.clone())),
            Box::new(RecentItemsBackend::new(self.paths.recent_items.clone())),
            Box::new(DiskByNameBackend::new()),
            Box::new(ShadowCopyBackend::new(SystemRunner)),
        ]
    }

    fn search_by_name(&self, verbose: bool) {
        let name = ask("  File name (or part of it): ");
        if name.is_empty() {
            println!("{}", "  A name is required.".red());
            return;
        }
        let query = SearchQuery::for_kind(&name, self.kind);

        let mut lists = Vec::new();
        for backend in self.all_backends() {
            println!("  {} {}...", "Searching".green(), backend.label());
            match run_with_progress(backend.as_ref(), &query) {
                BackendOutcome::Completed(records) => {
                    if verbose {
                        report::print_backend_summary(backend.label(), Ok(records.len()));
                    }
                    lists.push(records);
                }
                BackendOutcome::Skipped(reason) => {
                    report::print_backend_summary(backend.label(), Err(reason.as_str()));
                }
            }
        }

        let results = aggregate::merge(lists);
        let title = if verbose {
            format!("Full search for '{}'", name)
        } else {
            format!("Results for '{}'", name)
        };
        show_and_offer(&title, &results);
    }

    fn recent_documents(&self) {
        println!(
            "  {}",
            format!("Looking for {} files from the last {} days...", self.kind.label(), RECENT_DAYS)
                .yellow()
        );
        let query = SearchQuery::for_kind("", self.kind);
        let results = completed(run_with_progress(&DiskRecentBackend::new(), &query));
        show_and_offer(
            &format!("Recent {} files (last {} days)", self.kind.label(), RECENT_DAYS),
            &results,
        );
    }

    fn single_backend(&self, backend: &dyn SearchBackend, title: &str) {
        let filter = ask("  Filter by name (Enter to list all): ");
        let query = SearchQuery::for_kind(&filter, self.kind);
        let results = completed(run_with_progress(backend, &query));
        show_and_offer(title, &results);
    }

    fn shadow_by_path(&self) {
        let original = ask("  Original path of the file (e.g. C:\\Users\\me\\Book1.xlsx): ");
        if original.is_empty() {
            println!("{}", "  A path is required.".red());
            return;
        }
        let backend = ShadowCopyBackend::new(SystemRunner).with_original_path(&original);
        let query = SearchQuery::for_kind("", self.kind);
        match run_with_progress(&backend, &query) {
            BackendOutcome::Completed(results) => show_and_offer("Shadow copies", &results),
            BackendOutcome::Skipped(reason) => {
                println!("  {}", format!("Shadow copies not searched: {}", reason).yellow())
            }
        }
    }

    fn change_kind(&mut self) {
        for (i, kind) in DocumentKind::ALL.iter().enumerate() {
            println!("  {} - {}", i + 1, kind.label());
        }
        let choice = ask("  Document type: ");
        match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
            Some(i) if i < DocumentKind::ALL.len() => {
                self.kind = DocumentKind::ALL[i];
                println!("  Now searching for {} files.", self.kind.label().bold());
            }
            _ => println!("{}", "  Invalid option.".red()),
        }
    }
}

fn run_with_progress(backend: &dyn SearchBackend, query: &SearchQuery) -> BackendOutcome {
    let outcome = run_backend(backend, query, &mut |dir: &Path| report::show_progress(dir));
    report::clear_progress();
    outcome
}

fn completed(outcome: BackendOutcome) -> Vec<FileRecord> {
    match outcome {
        BackendOutcome::Completed(records) => records,
        BackendOutcome::Skipped(reason) => {
            println!("  {}", format!("Not attempted: {}", reason).yellow());
            Vec::new()
        }
    }
}

fn show_and_offer(title: &str, results: &[FileRecord]) {
    report::print_results(title, results);
    offer_restore(results);
}

fn offer_restore(results: &[FileRecord]) {
    if results.is_empty() {
        return;
    }
    println!("{}", "You can copy a found file to another location.".cyan().bold());
    let choice = ask("  Number of the file to copy (0 to skip): ");
    let index = match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= results.len() => n - 1,
        _ => return,
    };
    let selected = &results[index];
    if let Err(e) = restore::check_source(selected) {
        println!("  {}", e.to_string().red());
        return;
    }

    let default_dest = dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let answer = ask(&format!("  Destination folder (Enter = {}): ", default_dest.display()));
    let destination = if answer.is_empty() {
        default_dest
    } else {
        PathBuf::from(answer)
    };

    match restore::restore(selected, &destination) {
        Ok(copied) => println!("\n  {} {}\n", "File copied to:".green(), copied.display()),
        Err(e) => println!("  {}", e.to_string().red()),
    }
}

fn farewell_and_exit() -> ! {
    println!("\n{}", FAREWELL.cyan().bold());
    std::process::exit(0)
}

/// Prompts and reads one trimmed line; end of input ends the program
fn ask(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => farewell_and_exit(),
        Ok(_) => line.trim().to_string(),
        Err(e) => {
            log::warn!("stdin: {}", e);
            farewell_and_exit()
        }
    }
}

/// Ctrl+C only raises a flag; the farewell is printed from an ordinary thread
fn install_interrupt_handler() {
    let interrupted = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(SIGINT, Arc::clone(&interrupted)) {
        log::warn!("could not install Ctrl+C handler: {}", e);
        return;
    }
    watch_interrupt(interrupted, || farewell_and_exit());
}

fn watch_interrupt<F>(flag: Arc<AtomicBool>, on_interrupt: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::spawn(move || {
        while !flag.load(Ordering::Relaxed) {
            thread::sleep(INTERRUPT_POLL);
        }
        on_interrupt();
    })
}

fn print_menu(kind: DocumentKind) {
    println!("\n{}", "=== Lost File Finder ===".cyan().bold());
    println!("  Document type: {}\n", kind.label().bold());
    println!("  1 - Search by name");
    println!("  2 - Recent files (last {} days)", RECENT_DAYS);
    println!("  3 - Recycle Bin");
    println!("  4 - Temp / autorecovery files");
    println!("  5 - Windows recent items");
    println!("  6 - Full search (all sources)");
    println!("  7 - Shadow copies by original path");
    println!("  8 - Change document type");
    println!("  0 - Exit");
}

fn main() {
    let env = env_logger::Env::default().filter_or(LOG_ENV_VAR, DEFAULT_LOG_FILTER);
    env_logger::Builder::from_env(env).init();

    #[cfg(windows)]
    {
        let _ = colored::control::set_virtual_terminal(true);
    }
    install_interrupt_handler();

    if !privilege::is_elevated() {
        println!(
            "{}",
            "Not running as Administrator: shadow copies will be skipped.".yellow()
        );
    }

    let mut session = Session {
        kind: DocumentKind::default(),
        paths: RecoveryPaths::from_env(),
    };
    log::debug!("recovery paths: {:?}", session.paths);

    loop {
        print_menu(session.kind);
        match ask("\nChoose an option: ").as_str() {
            "1" => session.search_by_name(false),
            "2" => session.recent_documents(),
            "3" => session.single_backend(
                &RecycleBinBackend::new(SystemRunner),
                &format!("{} files in the Recycle Bin", session.kind.label()),
            ),
            "4" => session.single_backend(
                &TempFilesBackend::new(session.paths.autorecovery.clone()),
                "Temp / autorecovery files",
            ),
            "5" => session.single_backend(
                &RecentItemsBackend::new(session.paths.recent_items.clone()),
                "Windows recent items",
            ),
            "6" => session.search_by_name(true),
            "7" => session.shadow_by_path(),
            "8" => session.change_kind(),
            "0" => farewell_and_exit(),
            _ => println!("{}", "Invalid option.".red()),
        }
        ask("\nPress Enter to return to the menu");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_watcher_fires_once_flag_is_raised() {
        let flag = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let handle = watch_interrupt(Arc::clone(&flag), move || {
            let _ = tx.send(());
        });

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        flag.store(true, Ordering::Relaxed);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        handle.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_sigint_sets_flag_without_terminating() {
        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGINT, Arc::clone(&flag)).unwrap();
        signal_hook::low_level::raise(SIGINT).unwrap();
        assert!(flag.load(Ordering::Relaxed));
    }
}
