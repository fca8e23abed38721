fn main() -> anyhow::Result<()> {
    ai_commit_notes::cli::run()
}
