//! Merchant normalization preview

use anyhow::Result;
use finpulse_core::normalize::normalize_merchant;

/// One line per name: the raw text and the key it groups under
pub fn render_normalized(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let key = normalize_merchant(name);
            if key.is_empty() {
                format!("{:?} → (empty, excluded from detection)", name)
            } else {
                format!("{:?} → {}", name, key)
            }
        })
        .collect()
}

pub fn cmd_normalize(names: &[String]) -> Result<()> {
    for line in render_normalized(names) {
        println!("{}", line);
    }
    Ok(())
}
