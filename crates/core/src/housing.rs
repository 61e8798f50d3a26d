//! Stateless HCV question answering: eligibility, rent share and glossary.

/// Share of monthly adjusted income a voucher holder pays toward rent.
pub const TENANT_SHARE: f64 = 0.30;

/// Simplified income limits (about 80% of area median income) by family size.
const INCOME_LIMITS: [u64; 8] = [50_000, 57_000, 64_000, 71_000, 77_000, 83_000, 89_000, 95_000];

const GLOSSARY: &[(&str, &str)] = &[
    (
        "hcv",
        "Housing Choice Voucher - a federal program that helps low-income families afford decent, safe, and sanitary housing in the private market.",
    ),
    (
        "pha",
        "Public Housing Authority - the local government agency that administers HCV programs in your area.",
    ),
    (
        "hud",
        "Housing and Urban Development - the federal department that oversees HCV programs nationwide.",
    ),
    (
        "payment standard",
        "The maximum amount HCV will pay toward rent and utilities, set by the local PHA.",
    ),
    (
        "fair market rent",
        "The maximum rent amount HCV will cover, determined by HUD based on local market conditions.",
    ),
    (
        "housing quality standards",
        "Minimum requirements that HCV housing must meet for safety and habitability.",
    ),
    (
        "portability",
        "The ability to use your HCV voucher in a different PHA area when moving.",
    ),
    (
        "recertification",
        "Annual review of your continued eligibility for HCV assistance.",
    ),
    (
        "voucher",
        "The document that provides rental assistance and allows you to rent from private landlords.",
    ),
    (
        "income limit",
        "Maximum income allowed for HCV participation, typically 80% of Area Median Income.",
    ),
];

/// Income limit for a family size. Sizes outside the table, including zero,
/// use the largest limit.
pub fn income_limit(family_size: u32) -> u64 {
    match family_size as usize {
        size @ 1..=8 => INCOME_LIMITS[size - 1],
        _ => INCOME_LIMITS[INCOME_LIMITS.len() - 1],
    }
}

pub fn check_eligibility(family_size: u32, annual_income: f64, location: Option<&str>) -> String {
    let limit = income_limit(family_size);
    let verdict = if annual_income <= limit as f64 {
        "you may be eligible"
    } else {
        "you may not be eligible"
    };
    let area = match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) => format!("in {location} "),
        None => String::new(),
    };
    format!(
        "Based on your family size of {family_size} and annual income of ${}, {verdict} for HCV assistance. \
         The income limit for a family of {family_size} is typically around ${} per year. \
         However, actual limits vary by location and are set by local PHAs. \
         I recommend contacting your local Public Housing Authority {area}for exact income limits in your area.",
        format_dollars(annual_income),
        group_thousands(limit),
    )
}

/// Splits a monthly rent between tenant and voucher under the 30% rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentShare {
    pub tenant_portion: f64,
    pub hcv_portion: f64,
    /// What the tenant pays in total, including any amount above the payment standard.
    pub tenant_total: f64,
    pub exceeds_payment_standard: bool,
}

pub fn rent_share(adjusted_income: f64, total_rent: f64, payment_standard: Option<f64>) -> RentShare {
    let tenant_portion = adjusted_income * TENANT_SHARE;
    match payment_standard {
        Some(standard) if total_rent > standard => RentShare {
            tenant_portion,
            hcv_portion: standard - tenant_portion,
            tenant_total: tenant_portion + (total_rent - standard),
            exceeds_payment_standard: true,
        },
        _ => RentShare {
            tenant_portion,
            hcv_portion: total_rent - tenant_portion,
            tenant_total: tenant_portion,
            exceeds_payment_standard: false,
        },
    }
}

pub fn calculate_rent(adjusted_income: f64, total_rent: f64, payment_standard: Option<f64>) -> String {
    let share = rent_share(adjusted_income, total_rent, payment_standard);
    let mut result = format!(
        "With HCV assistance, you would pay approximately ${:.2} per month (30% of your adjusted income of ${:.2}).",
        share.tenant_portion, adjusted_income
    );
    match payment_standard {
        Some(standard) if share.exceeds_payment_standard => result.push_str(&format!(
            " However, since the rent (${total_rent:.2}) exceeds the payment standard (${standard:.2}), you would need to pay the difference, making your total payment ${:.2}.",
            share.tenant_total
        )),
        _ => result.push_str(&format!(
            " HCV would pay approximately ${:.2} toward your rent.",
            share.hcv_portion
        )),
    }
    result
}

pub fn explain_term(term: &str) -> String {
    let wanted = term.trim().to_lowercase();
    GLOSSARY
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, explanation)| explanation.to_string())
        .unwrap_or_else(|| {
            format!(
                "I don't have a specific explanation for \"{term}\" in my HCV glossary. \
                 Could you ask me about a different HCV term, or would you like me to explain what HCV, PHA, or Payment Standard means?"
            )
        })
}

/// Whole dollars with thousands separators; negative amounts keep their sign.
fn format_dollars(amount: f64) -> String {
    let whole = group_thousands(amount.abs().round() as u64);
    if amount.round() < 0.0 {
        format!("-{whole}")
    } else {
        whole
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
