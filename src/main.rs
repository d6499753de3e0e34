#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use tcxexport::database::SqliteSource;
use tcxexport::export::export_day;
use tcxexport::pg::{ConnectOptions, PgSource};
use tcxexport::tcx::RandomIds;
use tcxexport::{cli, utils};

#[macro_use]
extern crate tcxexport;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let out = cli.outfile.as_path();
    let mut ids = RandomIds;

    let result = if let Some(path) = cli.sqlite.as_deref() {
        dlog!("mode=sqlite snapshot={}", path.display());
        let mut source = SqliteSource::open(path)
            .with_context(|| format!("Opening SQLite snapshot: {}", path.display()))?;
        export_day(&mut source, &cli.user, &cli.date, out, cli.pretty, &mut ids)
    } else {
        dlog!("mode=pg host={} port={}", cli.dbhost, cli.dbport);
        let opts = ConnectOptions {
            host: cli.dbhost.clone(),
            port: cli.dbport,
            user: cli.dbuser.clone(),
            password: cli.password.clone(),
            dbname: cli.dbname.clone(),
        };
        let mut source = PgSource::connect(&opts).context("Connecting to PostgreSQL")?;
        export_day(&mut source, &cli.user, &cli.date, out, cli.pretty, &mut ids)
    };

    let summary = result.with_context(|| {
        format!(
            "Exporting user {} on {} to {}",
            cli.user,
            cli.date,
            out.display()
        )
    })?;

    dlog!(
        "done motion_rows={} position_rows={} trackpoints={}",
        summary.motion_rows,
        summary.position_rows,
        summary.trackpoints
    );
    Ok(())
}
