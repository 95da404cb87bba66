//! git-trello binary entry point.

fn main() {
    if let Err(err) = git_trello::cli::run() {
        git_trello::ui::output::error(format!("{err:#}"));
        std::process::exit(1);
    }
}
