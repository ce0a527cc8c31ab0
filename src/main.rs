mod cli;

use clap::Parser;

use cli::config::ConfigArgs;
use cli::search::SearchArgs;
use cli::{Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let data = cli.data.as_deref();

    let result = match cli.command {
        Commands::Ask { query, json } => cli::ask::run(data, &query, json),
        Commands::Search {
            query,
            range,
            from_date,
            to_date,
            category,
            min,
            max,
        } => cli::search::run(
            data,
            SearchArgs {
                query,
                range,
                from_date,
                to_date,
                categories: category,
                min,
                max,
            },
        ),
        Commands::Review => cli::review::run(data),
        Commands::Import {
            file,
            format,
            output,
        } => cli::import::run(&file, format.as_deref(), output.as_deref()),
        Commands::Export {
            format,
            output,
            save,
        } => cli::export::run(data, &format, output.as_deref(), save),
        Commands::Status => cli::status::run(data),
        Commands::Config {
            data_file,
            clear_data_file,
            user_name,
            export_dir,
        } => cli::config::run(ConfigArgs {
            data_file,
            clear_data_file,
            user_name,
            export_dir,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
