// demos/repo_summary.rs
//
// This example prints the working directory status and the most recent
// commits of a repository, with the files each commit changed.

use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::path::PathBuf;

use gitpilot_porcelain::log::LogQuery;
use gitpilot_porcelain::models::{AppFileStatus, StatusResult};
use gitpilot_porcelain::Repository;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let repo_path = args.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let count = args
        .get(2)
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(5);

    if !repo_path.exists() {
        eprintln!("Error: Directory does not exist: {}", repo_path.display());
        return Ok(());
    }

    let repo = Repository::new(&repo_path);

    match repo.status()? {
        Some(status) => print_status(&status),
        None => println!("Status output too large, skipped."),
    }

    println!("\nRecent commits:");
    let commits = repo.get_commits(&LogQuery::new("HEAD").max_count(count))?;
    if commits.is_empty() {
        println!("  (no commits yet)");
    }

    let mut per_author: HashMap<String, usize> = HashMap::new();
    for commit in &commits {
        *per_author.entry(commit.author.name.clone()).or_insert(0) += 1;

        let tags = if commit.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", commit.tags.join(", "))
        };
        println!(
            "  {} {} ({}, {}){}",
            commit.short_sha,
            commit.summary,
            commit.author.name,
            commit.author.date.format("%Y-%m-%d %H:%M %z"),
            tags
        );
        for co_author in commit.co_authors() {
            println!("      co-author: {} <{}>", co_author.name, co_author.email);
        }

        for change in repo.get_changed_files(&commit.sha.to_string())? {
            println!("      {} {}", describe(&change.status), change.path);
        }
    }

    if !per_author.is_empty() {
        println!("\nCommits by author:");
        let mut authors: Vec<_> = per_author.into_iter().collect();
        authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (name, commits) in authors {
            println!("  {:>4}  {}", commits, name);
        }
    }

    Ok(())
}

fn print_status(status: &StatusResult) {
    let branch = status
        .current_branch
        .as_ref()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "(detached)".to_string());
    println!("On branch {}", branch);

    if let Some(upstream) = &status.current_upstream_branch {
        match &status.branch_ahead_behind {
            Some(ab) => println!("Tracking {} (ahead {}, behind {})", upstream, ab.ahead, ab.behind),
            None => println!("Tracking {}", upstream),
        }
    }
    if status.stash_count > 0 {
        println!("Stashes: {}", status.stash_count);
    }
    if status.merging {
        println!("Merge in progress");
    }
    if status.rebasing {
        println!("Rebase in progress");
    }
    if status.cherry_picking {
        println!("Cherry-pick in progress");
    }

    if status.is_clean() {
        println!("Working tree clean");
        return;
    }
    for file in status.working_directory.files() {
        let staged = if file.is_staged() { "staged" } else { "      " };
        println!("  {} {:<10} {}", staged, describe(&file.status), file.path);
    }
}

fn describe(status: &AppFileStatus) -> String {
    match status {
        AppFileStatus::New => "new".to_string(),
        AppFileStatus::Modified => "modified".to_string(),
        AppFileStatus::Deleted => "deleted".to_string(),
        AppFileStatus::Renamed { old_path } => format!("renamed from {}", old_path),
        AppFileStatus::Copied { old_path } => format!("copied from {}", old_path),
        AppFileStatus::Conflicted(_) => "conflicted".to_string(),
        AppFileStatus::Untracked => "untracked".to_string(),
    }
}
