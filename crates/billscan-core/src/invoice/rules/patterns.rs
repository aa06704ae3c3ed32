//! Common regex patterns for marketplace invoice extraction.
//!
//! Ranked lists are tried in order; the `f32` is the confidence attached to
//! a match from that pattern.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Order identifiers, optionally with a `_N` sub-order suffix
    pub static ref ORDER_ID_PATTERNS: Vec<(Regex, f32)> = vec![
        (Regex::new(r"(?i)Order\s+ID\b\s*:*\s*(\d+(?:_\d+)?)").unwrap(), 0.95),
        (Regex::new(r"(?i)Order\s+No\b\.?\s*:*\s*(\d+(?:_\d+)?)").unwrap(), 0.95),
        (Regex::new(r"(?i)Order\s*:*\s*(\d+(?:_\d+)?)").unwrap(), 0.8),
        (Regex::new(r"\b(\d{12,}(?:_\d+)?)\b").unwrap(), 0.6),
    ];

    // Invoice identifiers
    pub static ref INVOICE_ID_PATTERNS: Vec<(Regex, f32)> = vec![
        (Regex::new(r"(?i)Invoice\s+No\b\.?\s*:*\s*([A-Za-z0-9][\w/-]*)").unwrap(), 0.95),
        (Regex::new(r"(?i)Invoice\s+ID\b\s*:*\s*([A-Za-z0-9][\w/-]*)").unwrap(), 0.95),
        (Regex::new(r"(?i)Invoice\s*:*\s*([A-Za-z]*\d[\w/-]*)").unwrap(), 0.8),
        (Regex::new(r"\b(INV[-_]?[A-Za-z0-9]*\d\w*)").unwrap(), 0.5),
    ];

    // Dates
    pub static ref LABELED_DATE_PATTERNS: Vec<(Regex, f32)> = vec![
        (Regex::new(r"(?i)Invoice\s+Date\s*:*\s*(\d{1,2}[/.-]\d{1,2}[/.-]\d{4})").unwrap(), 0.95),
        (Regex::new(r"(?i)Order\s+Date\s*:*\s*(\d{1,2}[/.-]\d{1,2}[/.-]\d{4})").unwrap(), 0.95),
        (Regex::new(r"(?i)\bDate\s*:*\s*(\d{1,2}[/.-]\d{1,2}[/.-]\d{4})").unwrap(), 0.85),
    ];

    pub static ref NUMERIC_DATE: Regex = Regex::new(
        r"\b(\d{1,2}[/.-]\d{1,2}[/.-]\d{4})\b"
    ).unwrap();

    pub static ref NUMERIC_DATE_PARTS: Regex = Regex::new(
        r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})$"
    ).unwrap();

    pub static ref ISO_DATE: Regex = Regex::new(
        r"\b(\d{4})[./-](\d{2})[./-](\d{2})\b"
    ).unwrap();

    pub static ref TEXT_DATE: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b"
    ).unwrap();

    // Customer address section
    pub static ref BILL_TO_MARKER: Regex = Regex::new(
        r"(?i)BILL\s+TO[\s/]*SHIP\s+TO|BILL\s+TO|SHIP\s+TO"
    ).unwrap();

    pub static ref PINCODE: Regex = Regex::new(r"\b(\d{6})\b").unwrap();

    pub static ref STATE_NAME: Regex = Regex::new(
        r"(?i)\b(Andhra Pradesh|Arunachal Pradesh|Himachal Pradesh|Madhya Pradesh|Uttar Pradesh|Tamil Nadu|West Bengal|Gujarat|Maharashtra|Rajasthan|Karnataka|Kerala|Telangana|Bihar|Odisha|Punjab|Haryana|Jharkhand|Assam|Uttarakhand|Chhattisgarh|Goa|Manipur|Meghalaya|Tripura|Nagaland|Mizoram|Sikkim|Delhi|Jammu|Kashmir)\b"
    ).unwrap();

    // Upper case only: "up", "or", "as" are ordinary words
    pub static ref STATE_ABBREVIATION: Regex = Regex::new(
        r"\b(AP|TN|KA|KL|MH|GJ|RJ|UP|MP|WB|BR|OR|PB|HR|JH|AS|HP|UK|CG|GA|MN|ML|TR|NL|MZ|AR|SK|DL)\b"
    ).unwrap();

    pub static ref CITY_BEFORE_DASH_PINCODE: Regex = Regex::new(
        r"([A-Za-z ]+?)\s*-\s*\d{6}\b"
    ).unwrap();

    pub static ref CITY_BETWEEN_COMMAS: Regex = Regex::new(
        r",\s*([A-Za-z ]+?)\s*,"
    ).unwrap();

    pub static ref CITY_BEFORE_PINCODE: Regex = Regex::new(
        r"([A-Za-z]+)\s+\d{6}\b"
    ).unwrap();

    // HSN codes
    pub static ref HSN_PATTERNS: Vec<(Regex, f32)> = vec![
        (Regex::new(r"(?i)HSN.*?(\d{4})").unwrap(), 0.9),
        (Regex::new(r"(?i)HSN\s*Code\s*:?\s*(\d{4})").unwrap(), 0.95),
        (Regex::new(r"(?i)Harmonized.*?Code\s*:?\s*(\d{4})").unwrap(), 0.9),
        (Regex::new(r"(?i)Item\s*Code\s*:?\s*(\d{4})").unwrap(), 0.6),
    ];

    // Product rows: name, size, quantity, colour, per-item order number
    pub static ref ITEM_ROW_WITH_SUBORDER: Regex = Regex::new(
        r"([A-Za-z][\w&'.()-]*(?:[ \t]+[\w&'.()-]+){0,7})[ \t]+(?i:Free[ \t]?Size)[ \t]+(\d+)[ \t]+([^₹\n\d]+?)[ \t]+(\d{12,}_\d+)"
    ).unwrap();

    pub static ref ITEM_ROW_KEYWORD_NAME: Regex = Regex::new(
        r"((?:3?Combo|Ayan|Surat|Kurta|Set|Pack|New|Trendy|Stylish|Elegant|Fashion|Designer)\w*[^,\n]*?)[ \t]+(?i:Free[ \t]?Size)[ \t]+(\d+)[ \t]+([^₹\n\d]+?)[ \t]+(\d{12,}_\d+)"
    ).unwrap();

    pub static ref ITEM_ROW_SIZE_QTY_COLOR: Regex = Regex::new(
        r"([A-Za-z]\w+(?:[ \t]+\w+){0,5})[ \t]+(?i:Free[ \t]?Size|Freesize)[ \t]+(\d+)[ \t]+([A-Za-z]+)"
    ).unwrap();

    pub static ref PRODUCT_SECTION_HEADING: Regex = Regex::new(
        r"(?i)\b(?:Product\s+Details|Description)\b"
    ).unwrap();

    pub static ref SKU_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bSKU\s*:?\s*([A-Z0-9][A-Z0-9-]*)").unwrap(),
        Regex::new(r"(?i)\bProduct\s+Code\s*:?\s*([A-Z0-9][A-Z0-9-]*)").unwrap(),
        Regex::new(r"(?i)\bItem\s+Code\s*:?\s*([A-Z0-9][A-Z0-9-]*)").unwrap(),
    ];

    pub static ref GENERIC_ITEM: Regex = Regex::new(
        r"(?i)\b(?:Item|Product)[ \t]*:?[ \t]*([A-Za-z][A-Za-z0-9 \t]{3,50})"
    ).unwrap();

    pub static ref NON_PRODUCT_KEYWORDS: Regex = Regex::new(r"(?i)invoice|bill|total").unwrap();

    // Prices near a product mention, most specific first
    pub static ref PRICE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"₹\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)Rs\.?\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)\bINR\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"\b([1-4]?\d{2,3}|5000)\b").unwrap(),
    ];

    // Currency amounts over the whole section, labelled totals first
    pub static ref FALLBACK_AMOUNT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)Total.*?(?:₹|Rs\.?|INR)\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)Amount.*?(?:₹|Rs\.?|INR)\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)(?:₹|Rs\.?|INR)\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
    ];

    // Totals
    pub static ref TOTAL_KEYWORD: Regex = Regex::new(r"(?i)total").unwrap();

    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"(?i)(?:Rs\.?|₹)\s*(\d[\d,]*(?:\.\d{1,2})?)"
    ).unwrap();

    pub static ref LABELED_TOTAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)Total\s*Amount\s*:*\s*(?:₹|Rs\.?)?\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)Grand\s*Total\s*:*\s*(?:₹|Rs\.?)?\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)Final\s*Amount\s*:*\s*(?:₹|Rs\.?)?\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r"(?i)Amount\s*:*\s*(?:₹|Rs\.?)?\s*(\d[\d,]*(?:\.\d{1,2})?)").unwrap(),
    ];
}
