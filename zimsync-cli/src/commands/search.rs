//! `zimsync search` - discover archives as ready-to-paste config blocks.

use zimsync::{search_configs, Config, HttpCatalog};

use crate::error::CliError;

pub fn run(
    config: &Config,
    lang: Option<&str>,
    category: Option<&str>,
    query: Option<&str>,
) -> Result<bool, CliError> {
    let catalog = HttpCatalog::new(config.feed_url.as_str());
    let languages = super::parse_languages(lang);

    let blocks = search_configs(&catalog, languages.as_ref(), category, query)?;

    if blocks.is_empty() {
        println!("no archives matched");
    } else {
        println!("{}", blocks);
    }
    Ok(true)
}
