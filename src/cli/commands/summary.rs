//! Library summary command handler

use crate::config::Config;
use crate::db::Store;
use crate::domain::MediaKind;

pub async fn cmd_summary(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(user) = store.get_user_by_username(username).await? else {
        println!("No user named '{username}'.");
        return Ok(());
    };

    println!("Library of {}", user.username);
    println!("{:-<30}", "");

    let mut total = 0;
    for kind in MediaKind::ALL {
        let count = store.library_count(kind.descriptor(), user.id).await?;
        total += count;
        println!("{:<10} {:>6}", kind.to_string(), count);
    }
    println!("{:<10} {:>6}", "Total", total);

    Ok(())
}
