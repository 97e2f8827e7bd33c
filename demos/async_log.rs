// demos/async_log.rs
//
// This example uses the async API to read the log of a repository and
// the files changed between two revisions.

use std::error::Error;
use std::path::Path;

use gitpilot_porcelain::log::LogQuery;
use gitpilot_porcelain::AsyncRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <repository_path> [<base> <head>]", args[0]);
        eprintln!("Example: {} . HEAD~3 HEAD", args[0]);
        return Ok(());
    }

    let repo_path = Path::new(&args[1]);
    let repo = AsyncRepository::new(repo_path);

    let start_time = std::time::Instant::now();
    let commits = repo.get_commits(&LogQuery::new("HEAD").max_count(20)).await?;
    println!("Read {} commits in {:?}", commits.len(), start_time.elapsed());

    for commit in &commits {
        let marker = if commit.is_merge_commit() { "M" } else { " " };
        println!("{} {} {}", marker, commit.short_sha, commit.summary);
        for (key, values) in commit.trailers.iter() {
            for value in values {
                println!("      {}: {}", key, value);
            }
        }
    }

    if let (Some(base), Some(head)) = (args.get(2), args.get(3)) {
        println!("\nChanged between {} and {}:", base, head);
        for change in repo.get_changed_files_between(base, head).await? {
            println!("  {:?} {}", change.status, change.path);
        }
    }

    Ok(())
}
