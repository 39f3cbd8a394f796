//! Catalog listing.

use anyhow::{Result, bail};
use conveyor_actions::{KindInfo, catalog};

pub fn list(kind: Option<&str>) -> Result<()> {
    match kind {
        Some(kind) => match catalog::lookup(kind) {
            Some(info) => println!("{}", describe(info)),
            None => bail!("Unknown action kind: {kind}"),
        },
        None => {
            for info in catalog::kinds() {
                println!("{}", describe(info));
            }
        }
    }
    Ok(())
}

fn describe(info: &KindInfo) -> String {
    let mut line = format!(
        "{:<22} {:<58} requires: {}",
        info.kind,
        info.type_token,
        info.required_fields.join(", ")
    );
    if info.replace_on_change {
        line.push_str(" (replaced on any change)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let line = describe(catalog::lookup("RUN_NEXT_PIPELINE").unwrap());
        assert!(line.starts_with("RUN_NEXT_PIPELINE"));
        assert!(line.contains("next_pipeline_id"));
        assert!(line.ends_with("(replaced on any change)"));
    }

    #[test]
    fn test_unknown_kind() {
        assert!(list(Some("NOPE")).is_err());
    }
}
