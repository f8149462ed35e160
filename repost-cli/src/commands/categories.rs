//! `repost categories <name>...`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use repost_sync::category::{audience_group_for, map_categories_to_groups};

/// Show the audience groups feed categories map to.
#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Feed category names, e.g. "Health & Wellness".
    #[arg(required = true)]
    pub names: Vec<String>,
}

impl CategoriesArgs {
    pub fn run(self) -> Result<()> {
        for name in &self.names {
            match audience_group_for(name) {
                Some(group) => println!("{name} → {}", group.green()),
                None => println!("{name} → {}", "no targeting".bright_black()),
            }
        }

        let groups = map_categories_to_groups(self.names.iter().map(String::as_str));
        if groups.is_empty() {
            println!("Audience groups: none");
        } else {
            println!("Audience groups: {}", groups.join(", "));
        }
        Ok(())
    }
}
