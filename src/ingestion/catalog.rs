//! Static financial education seed content

/// One evergreen education article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EducationEntry {
    pub title: &'static str,
    pub content: &'static str,
}

impl EducationEntry {
    /// Text fed to the embedding model
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// Category recorded in the metadata of every seeded document
pub const EDUCATION_CATEGORY: &str = "financial_education";

pub const FINANCIAL_EDUCATION: &[EducationEntry] = &[
    EducationEntry {
        title: "What is Dollar-Cost Averaging (DCA)?",
        content: "Dollar-cost averaging is an investment strategy where you invest a fixed amount \
                  of money at regular intervals, regardless of the asset's price. This reduces the \
                  impact of volatility by buying more shares when prices are low and fewer when \
                  prices are high. DCA is popular among long-term investors as it removes \
                  emotional decision-making and is especially useful in volatile markets. However, \
                  in a consistently rising market, lump-sum investing may outperform DCA.",
    },
    EducationEntry {
        title: "Understanding Price-to-Earnings (P/E) Ratio",
        content: "The P/E ratio measures a company's stock price relative to its earnings per \
                  share (EPS). A high P/E may indicate that investors expect future growth, while \
                  a low P/E may suggest the stock is undervalued or that the company faces \
                  challenges. The forward P/E uses estimated future earnings. Comparing P/E ratios \
                  within the same sector is more meaningful than cross-sector comparisons. The S&P \
                  500 historical average P/E is around 15-17.",
    },
    EducationEntry {
        title: "Market Capitalization Explained",
        content: "Market cap = stock price × total shares outstanding. Large-cap companies (>$10B) \
                  are typically more stable. Mid-cap ($2B-$10B) offer growth potential with \
                  moderate risk. Small-cap (<$2B) can have high growth but higher volatility. \
                  Mega-cap companies (>$200B) like Apple, Microsoft, and Google dominate major \
                  indices. Market cap helps investors understand relative company size and risk \
                  profile.",
    },
    EducationEntry {
        title: "What is Beta in Stock Analysis?",
        content: "Beta measures a stock's volatility relative to the overall market (usually S&P \
                  500). A beta of 1.0 means the stock moves with the market. Beta > 1.0 = more \
                  volatile than the market (e.g., tech stocks often have beta 1.2-1.5). Beta < 1.0 \
                  = less volatile (e.g., utilities, consumer staples). Negative beta means the \
                  stock moves inversely to the market. Beta is useful for portfolio risk \
                  management but doesn't capture all risk factors.",
    },
    EducationEntry {
        title: "Dividend Investing Strategy",
        content: "Dividend investing focuses on stocks that regularly pay dividends, providing \
                  passive income. Key metrics: dividend yield (annual dividend / price), payout \
                  ratio (dividends / earnings), and dividend growth rate. Dividend aristocrats are \
                  S&P 500 companies that have increased dividends for 25+ consecutive years. A \
                  sustainable payout ratio below 60% is generally healthy. DRIP (Dividend \
                  Reinvestment Plan) compounds returns over time.",
    },
    EducationEntry {
        title: "Understanding Stock Market Sectors",
        content: "The market is divided into 11 GICS sectors: Technology, Healthcare, Financials, \
                  Consumer Discretionary, Communication Services, Industrials, Consumer Staples, \
                  Energy, Utilities, Real Estate, and Materials. Sector rotation occurs as \
                  economic cycles change. Defensive sectors (utilities, healthcare, staples) \
                  outperform in downturns. Cyclical sectors (tech, consumer discretionary, \
                  financials) outperform in expansions. Diversifying across sectors reduces \
                  portfolio risk.",
    },
    EducationEntry {
        title: "What is the Sharpe Ratio?",
        content: "The Sharpe Ratio measures risk-adjusted return: (Return - Risk-free rate) / \
                  Standard deviation. A higher Sharpe ratio indicates better risk-adjusted \
                  performance. Sharpe > 1.0 is considered good, > 2.0 is very good, > 3.0 is \
                  excellent. It helps compare investments with different risk levels. Limitations: \
                  assumes normal distribution of returns, doesn't distinguish between upside and \
                  downside volatility. The Sortino ratio addresses the latter limitation.",
    },
    EducationEntry {
        title: "Value at Risk (VaR) Explained",
        content: "VaR estimates the maximum expected loss over a given time period at a confidence \
                  level. For example, a 95% daily VaR of 2% means there's a 5% chance of losing \
                  more than 2% in a single day. Methods: Historical simulation, \
                  variance-covariance, Monte Carlo. Limitations: doesn't predict magnitude of \
                  extreme losses (tail risk), assumes past patterns continue. Complement with \
                  stress testing and Expected Shortfall (CVaR) for better risk assessment.",
    },
    EducationEntry {
        title: "Technical Analysis: Moving Averages",
        content: "Moving averages smooth price data to identify trends. Simple Moving Average \
                  (SMA) gives equal weight to all periods. Exponential Moving Average (EMA) gives \
                  more weight to recent prices. Common signals: Golden Cross (50-day MA crosses \
                  above 200-day MA = bullish), Death Cross (50-day crosses below 200-day = \
                  bearish). The 200-day MA is widely watched as a long-term trend indicator. \
                  Moving averages work best in trending markets, not sideways markets.",
    },
    EducationEntry {
        title: "Portfolio Diversification Principles",
        content: "Diversification reduces unsystematic risk by spreading investments across \
                  different assets. Modern Portfolio Theory (Markowitz) shows that combining \
                  uncorrelated assets reduces portfolio volatility without sacrificing returns. \
                  Diversify across: asset classes (stocks, bonds, real estate), sectors, \
                  geographies, company sizes, and investment styles (growth vs value). The \
                  correlation between assets matters more than the number of holdings. \
                  Over-diversification can dilute returns.",
    },
    EducationEntry {
        title: "Understanding Earnings Reports",
        content: "Quarterly earnings reports include: revenue (top line), net income (bottom \
                  line), earnings per share (EPS), and guidance (forward-looking estimates). An \
                  earnings 'beat' means actual results exceeded analyst estimates. Stocks often \
                  move 5-10% after earnings surprises. Key metrics to watch: revenue growth rate, \
                  profit margins, same-store sales, subscriber growth. Forward guidance often \
                  matters more than past results. Earnings whisper numbers (unofficial estimates) \
                  can differ from consensus estimates.",
    },
    EducationEntry {
        title: "Risk Management in Trading",
        content: "Key risk management principles: Never risk more than 1-2% of portfolio on a \
                  single trade. Use stop-loss orders to limit downside (typically 5-10% below \
                  entry). Position sizing: calculate trade size based on risk per trade and \
                  stop-loss distance. Risk/reward ratio: aim for at least 1:2 (risk $1 to make \
                  $2). Diversify positions across sectors. Keep a trading journal to track \
                  performance and improve decision-making. Avoid revenge trading after losses.",
    },
    EducationEntry {
        title: "Bull vs Bear Markets",
        content: "A bull market is characterized by rising prices (20%+ gain from recent low), \
                  optimism, and economic expansion. A bear market is a 20%+ decline from recent \
                  high, with pessimism and economic contraction. Bull markets historically last \
                  longer (average 4-5 years) than bear markets (average 1-1.5 years). Strategies \
                  differ: buy-and-hold and growth investing in bulls; defensive stocks, bonds, and \
                  hedging in bears. Market corrections (10-20% decline) are normal and occur on \
                  average every 1-2 years.",
    },
    EducationEntry {
        title: "What is Fundamental Analysis?",
        content: "Fundamental analysis evaluates a company's intrinsic value by examining \
                  financial statements, industry conditions, and economic factors. Key financial \
                  ratios: P/E, P/B (price-to-book), debt-to-equity, ROE (return on equity), \
                  current ratio, and free cash flow. Qualitative factors: management quality, \
                  competitive advantages (moats), market share, and industry trends. Discounted \
                  Cash Flow (DCF) models estimate fair value based on projected future cash flows. \
                  Compare with peers and historical averages.",
    },
    EducationEntry {
        title: "Understanding ETFs vs Mutual Funds vs Individual Stocks",
        content: "ETFs (Exchange-Traded Funds) trade like stocks on exchanges, often tracking an \
                  index. Lower expense ratios than mutual funds, tax-efficient, and highly liquid. \
                  Mutual funds are actively managed (usually), priced once daily, may have minimum \
                  investments. Individual stocks offer highest potential returns but highest risk. \
                  For beginners, broad market ETFs like SPY (S&P 500) or VTI (Total Stock Market) \
                  provide instant diversification. Consider your risk tolerance, time horizon, and \
                  investment knowledge when choosing.",
    },
];
