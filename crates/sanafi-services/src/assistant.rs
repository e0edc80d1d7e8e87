//! Canned assistant replies keyed on words in the prompt.

pub const GREETING: &str = "Hello! I'm Sanafi AI, your personal financial assistant. I can help you with transactions, market insights, portfolio analysis, and answer any questions about your digital wallet. How can I assist you today?";

const PORTFOLIO: &str = "Based on your current holdings, you have a well-diversified portfolio with AED Sanafi (65%), USDC (15%), and other tokens (20%). Your portfolio has grown 12.5% this month. Consider rebalancing if you want to reduce exposure to any single asset.";
const MARKET: &str = "Current market trends show AED Sanafi is up 2.3% today, with strong support at AED 3.60. USDC remains stable, while SANA token is showing bullish momentum with 8.2% gains this week. The overall crypto market is in a consolidation phase.";
const TRANSACTION: &str = "To send money with Sanafi: 1) Go to the Send tab, 2) Select your token, 3) Enter the amount, 4) Add recipient's wallet address or select from contacts, 5) Review details and confirm with biometric authentication. Transactions typically complete within seconds.";
const SUGGESTIONS: &str = "Here are some smart suggestions: 1) Enable auto-savings to set aside 10% of incoming transfers, 2) Consider staking your SANA tokens for 8% APY, 3) Set up price alerts for your favorite tokens, 4) Use our DCA feature for regular investments.";
const FALLBACK: &str = "I understand you're asking about financial matters. As your AI assistant, I can help with portfolio analysis, market insights, transaction guidance, and wallet optimization. Could you be more specific about what you'd like to know?";

const TOPICS: [(&[&str], &str); 4] = [
    (&["portfolio", "holding", "balance"], PORTFOLIO),
    (&["market", "trend", "price"], MARKET),
    (&["send", "transfer", "transaction"], TRANSACTION),
    (&["suggest", "optimize", "improve"], SUGGESTIONS),
];

/// Quick-action prompts offered before the user types anything.
pub const QUICK_PROMPTS: [(&str, &str); 4] = [
    ("Portfolio Analysis", "Can you analyze my current portfolio and provide insights?"),
    ("Market Trends", "What are the current market trends for my tokens?"),
    ("Transaction Help", "How do I send money to someone using Sanafi?"),
    ("Smart Suggestions", "What are some smart suggestions to optimize my wallet?"),
];

pub fn canned_reply(prompt: &str) -> &'static str {
    let lower = prompt.to_lowercase();
    TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK)
}
