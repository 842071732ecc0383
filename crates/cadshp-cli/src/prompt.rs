//! Terminal field picker.

use anyhow::{Result, bail};
use async_trait::async_trait;
use cadshp_core_common::{FieldPicker, PickItem};
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Table row of a pickable item.
#[derive(Tabled)]
struct PickRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Field")]
    label: String,
    #[tabled(rename = "Examples")]
    detail: String,
}

/// Asks on the terminal which fields name the feature layers.
///
/// The answer is a comma or space separated list of item numbers or labels; the
/// order of the answer is the priority order. An empty answer selects nothing.
#[derive(Debug, Default)]
pub struct PromptPicker;

#[async_trait]
impl FieldPicker for PromptPicker {
    async fn pick(
        &mut self,
        title: &str,
        items: Vec<PickItem>,
        multi_select: bool,
    ) -> Result<Vec<PickItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<PickRow> = items
            .iter()
            .enumerate()
            .map(|(i, item)| PickRow {
                index: i + 1,
                label: item.label.clone(),
                detail: item.detail.clone(),
            })
            .collect();
        println!("\n{title}:\n");
        println!("{}", Table::new(rows));
        println!("Enter numbers or names in priority order (empty for none):");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        let picked = parse_selection(&line, &items)?;
        if !multi_select && picked.len() > 1 {
            bail!("Only one item may be selected");
        }
        Ok(picked)
    }
}

/// Resolves an answer line against the offered items.
///
/// # Errors
///
/// Returns an error naming the first token that matches no item.
pub fn parse_selection(line: &str, items: &[PickItem]) -> Result<Vec<PickItem>> {
    let mut picked: Vec<PickItem> = Vec::new();
    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let item = match token.parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => &items[n - 1],
            _ => match items.iter().find(|i| i.label == token) {
                Some(item) => item,
                None => bail!("'{token}' is not one of the offered fields"),
            },
        };
        if !picked.contains(item) {
            picked.push(item.clone());
        }
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<PickItem> {
        ["name", "area", "zone"]
            .iter()
            .map(|label| PickItem {
                label: (*label).to_string(),
                kind: "field".to_string(),
                detail: String::new(),
            })
            .collect()
    }

    fn labels(picked: &[PickItem]) -> Vec<&str> {
        picked.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_numbers_and_names_keep_order() -> Result<()> {
        let picked = parse_selection("3, name 2\n", &items())?;
        assert_eq!(labels(&picked), vec!["zone", "name", "area"]);
        Ok(())
    }

    #[test]
    fn test_empty_answer() -> Result<()> {
        assert!(parse_selection("\n", &items())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_repeats_are_dropped() -> Result<()> {
        let picked = parse_selection("1,name", &items())?;
        assert_eq!(labels(&picked), vec!["name"]);
        Ok(())
    }

    #[test]
    fn test_unknown_token() {
        let err = parse_selection("owner", &items()).unwrap_err();
        assert_eq!(err.to_string(), "'owner' is not one of the offered fields");
        assert!(parse_selection("9", &items()).is_err());
    }
}
