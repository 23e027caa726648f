use super::ui;
use crate::core::pricing::{parse_karat, purity_adjusted};
use crate::core::{MarketQuote, PriceFeed};
use anyhow::Result;
use comfy_table::Cell;

/// Purities shown when no karat is requested.
pub const COMMON_KARATS: [u8; 5] = [24, 22, 21, 18, 14];

pub fn render_quote_table(
    quote: &MarketQuote,
    karats: &[u8],
    base_currency: &str,
    target_currency: &str,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Karat"),
        ui::header_cell(&format!("Per gram ({base_currency})")),
        ui::header_cell(&format!("Per gram ({target_currency})")),
    ]);

    for &karat in karats {
        let base_price = purity_adjusted(quote.gold_per_gram, karat);
        table.add_row(vec![
            Cell::new(format!("{karat}k")),
            ui::amount_cell(base_price),
            ui::amount_cell(base_price * quote.exchange_rate),
        ]);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Gold price per gram", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}: {}",
        ui::style_text(&format!("{base_currency}/{target_currency}"), ui::StyleType::TotalLabel),
        ui::style_text(&format!("{:.4}", quote.exchange_rate), ui::StyleType::Subtle)
    ));
    output
}

pub async fn display_quote(feed: &PriceFeed, karat: Option<&str>) -> Result<()> {
    let karats = match karat {
        Some(raw) => vec![parse_karat(raw)?],
        None => COMMON_KARATS.to_vec(),
    };

    let quote = feed.fetch_quote().await?;
    println!(
        "{}",
        render_quote_table(&quote, &karats, feed.base_currency(), feed.target_currency())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_quote_table() {
        console::set_colors_enabled(false);
        let quote = MarketQuote {
            gold_per_gram: 100.0,
            exchange_rate: 30.0,
        };

        let output = render_quote_table(&quote, &[24, 18], "USD", "EGP");
        assert!(output.contains("Per gram (EGP)"));
        assert!(output.contains("24k"));
        assert!(output.contains("3000.00"));
        assert!(output.contains("18k"));
        assert!(output.contains("75.00"));
        assert!(output.contains("2250.00"));
        assert!(output.contains("USD/EGP"));
    }
}
