use anyhow::Result;

use ledgerlens::settings::{load_settings, save_settings, settings_path};

pub struct ConfigArgs {
    pub data_file: Option<String>,
    pub clear_data_file: bool,
    pub user_name: Option<String>,
    pub export_dir: Option<String>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut settings = load_settings();
    if let Some(f) = args.data_file {
        settings.data_file = Some(f);
    }
    if args.clear_data_file {
        settings.data_file = None;
    }
    if let Some(name) = args.user_name {
        settings.user_name = name;
    }
    if let Some(dir) = args.export_dir {
        settings.export_dir = dir;
    }
    save_settings(&settings)?;

    println!("Saved {}", settings_path().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
