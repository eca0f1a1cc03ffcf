//! The built-in extraction table, one row per supported Hebrew phrasing.
//!
//! Rows are evaluated in order within a domain, so more specific phrasings
//! come first (an order-note command also contains "הוסף", a quantity
//! update also contains "מלאי").

use sb_protocol::{ActionOp, InformationOp, Operation, ResearchOp};

use super::{Capture, Fallback, FieldKind, Flag, Generator, KeywordChoice, Literal, Scan, Rule};

const COUPON_UNITS: &[(&str, &str)] = &[
    ("אחוז", "percent"),
    ("%", "percent"),
    ("שקל", "fixed_cart"),
    ("שקלים", "fixed_cart"),
    ("ש\"ח", "fixed_cart"),
    ("₪", "fixed_cart"),
];

const STOCK_STATUSES: &[(&str, &str)] = &[
    ("במלאי", "instock"),
    ("אזל", "outofstock"),
    ("בהזמנה מראש", "onbackorder"),
];

const POINTS_ACTIONS: &[(&str, &str)] = &[("הוסף", "add"), ("הורד", "subtract")];

const ORDER_ID: Capture = Capture { param: "order_id", group: "order_id", kind: FieldKind::Integer };
const PRODUCT_NAME: Capture = Capture { param: "product_name", group: "product_name", kind: FieldKind::Text };

const REASON: Scan = Scan {
    param: "reason",
    pattern: r"סיבה\s*:?\s*(?P<v>[^.]+)",
    kind: FieldKind::Text,
    fallback: Fallback::Omit,
};

const NOTE: Scan = Scan {
    param: "note",
    pattern: r"הערה\s*:?\s*(?P<v>.+)$",
    kind: FieldKind::Text,
    fallback: Fallback::Omit,
};

const MARKET_SEGMENT: Scan = Scan {
    param: "market_segment",
    pattern: r"(?:בתחום|בענף)\s+(?P<v>[^\s,.?!]+)",
    kind: FieldKind::Text,
    fallback: Fallback::Literal(Literal::Text("אופנה")),
};

pub static RULES: &[Rule] = &[
    // ── Information ─────────────────────────────────────────────
    Rule::new(
        Operation::Information(InformationOp::TrackShipment),
        &["מעקב", "סטטוס המשלוח", "איפה המשלוח"],
        r"הזמנה\s*(?:מספר\s*)?(?P<order_id>[0-9]+)",
    )
    .captures(&[ORDER_ID])
    .hint("למעקב אחר משלוח כתוב: מעקב משלוח להזמנה <מספר הזמנה>"),
    Rule::new(
        Operation::Information(InformationOp::GetCustomerOrders),
        &["היסטורי", "הזמנות של לקוח", "הזמנות של הלקוח", "הזמנות לקוח"],
        r"לקוח\s*(?:מספר\s*)?(?P<customer_id>[0-9]+)",
    )
    .captures(&[Capture { param: "customer_id", group: "customer_id", kind: FieldKind::Integer }])
    .hint("להצגת הזמנות של לקוח כתוב: הצג היסטוריית הזמנות של לקוח <מספר לקוח>"),
    Rule::new(
        Operation::Information(InformationOp::GetOrder),
        &["פרטי הזמנה", "פרטי ההזמנה", "הצג הזמנה", "הצג את הזמנה", "תראה הזמנה"],
        r"הזמנה\s*(?:מספר\s*)?(?P<order_id>[0-9]+)",
    )
    .captures(&[ORDER_ID])
    .hint("להצגת הזמנה כתוב: הצג פרטי הזמנה <מספר הזמנה>"),
    Rule::new(Operation::Information(InformationOp::GetProducts), &["מוצרים"], "").scans(&[Scan {
        param: "per_page",
        pattern: r"(?P<v>[0-9]+)\s+מוצרים",
        kind: FieldKind::Integer,
        fallback: Fallback::Omit,
    }]),
    Rule::new(Operation::Information(InformationOp::GetSalesReport), &["דוח", "מכירות"], "").keywords(&[
        KeywordChoice {
            param: "period",
            options: &[("חודש", "month"), ("שנה", "year"), ("שנתי", "year"), ("שבוע", "week")],
            default: Some("week"),
        },
    ]),
    Rule::new(Operation::Information(InformationOp::GetCoupons), &["קופונים", "הנחות", "קופון"], ""),
    // ── Action: orders ──────────────────────────────────────────
    Rule::new(
        Operation::Action(ActionOp::UpdateOrderStatus),
        &["סטטוס הזמנה", "סטטוס ההזמנה"],
        r"סטטוס\s+(?:ה)?הזמנה\s+(?:מספר\s+)?(?P<order_id>[0-9]+)\s+ל-?\s*(?P<status>\S+)",
    )
    .captures(&[ORDER_ID, Capture { param: "status", group: "status", kind: FieldKind::Text }])
    .scans(&[NOTE])
    .hint("לעדכון סטטוס כתוב: עדכן סטטוס הזמנה <מספר> ל<סטטוס> [הערה: <טקסט>]"),
    Rule::new(
        Operation::Action(ActionOp::AddOrderNote),
        &["הוסף הערה"],
        r"הזמנה\s*(?:מספר\s*)?(?P<order_id>[0-9]+)\s*:\s*(?P<note>.+)$",
    )
    .captures(&[ORDER_ID, Capture { param: "note", group: "note", kind: FieldKind::Text }])
    .flags(&[Flag { param: "is_customer_note", keyword: "ללקוח" }])
    .hint("להוספת הערה כתוב: הוסף הערה [ללקוח] להזמנה <מספר>: <טקסט ההערה>"),
    Rule::new(
        Operation::Action(ActionOp::ProcessRefund),
        &["בצע החזר", "החזר כספי"],
        r"הזמנה\s*(?:מספר\s*)?(?P<order_id>[0-9]+)\s+(?:בסך|על\s+סך|בסכום)\s+(?P<amount>[0-9]+(?:\.[0-9]+)?)",
    )
    .captures(&[ORDER_ID, Capture { param: "amount", group: "amount", kind: FieldKind::Number }])
    .scans(&[REASON])
    .hint("לביצוע החזר כתוב: בצע החזר להזמנה <מספר> בסך <סכום> [סיבה: <סיבה>]"),
    Rule::new(
        Operation::Action(ActionOp::ApproveOrder),
        &["אשר הזמנה", "אשר את הזמנה", "אשר את ההזמנה"],
        r"אשר\s+(?:את\s+)?(?:ה)?הזמנה\s+(?:מספר\s+)?(?P<order_id>[0-9]+)",
    )
    .captures(&[ORDER_ID])
    .scans(&[NOTE])
    .hint("לאישור הזמנה כתוב: אשר הזמנה <מספר> [הערה: <טקסט>]"),
    Rule::new(
        Operation::Action(ActionOp::RejectOrder),
        &["דחה הזמנה", "דחה את הזמנה", "דחה את ההזמנה"],
        r"דחה\s+(?:את\s+)?(?:ה)?הזמנה\s+(?:מספר\s+)?(?P<order_id>[0-9]+)",
    )
    .captures(&[ORDER_ID])
    .scans(&[Scan {
        param: "reason",
        pattern: r"סיבה\s*:?\s*(?P<v>.+)$",
        kind: FieldKind::Text,
        fallback: Fallback::Omit,
    }])
    .hint("לדחיית הזמנה כתוב: דחה הזמנה <מספר> [סיבה: <סיבה>]"),
    // ── Action: customers ───────────────────────────────────────
    Rule::new(
        Operation::Action(ActionOp::ManageCustomerPoints),
        &["נקודות"],
        r"(?P<action>הוסף|הורד)\s+(?P<points>[0-9]+)\s+נקודות\s+(?:מועדון\s+)?(?:ל)?לקוח\s+(?:מספר\s+)?(?P<customer_id>[0-9]+)",
    )
    .captures(&[
        Capture { param: "customer_id", group: "customer_id", kind: FieldKind::Integer },
        Capture { param: "action", group: "action", kind: FieldKind::Choice(POINTS_ACTIONS) },
        Capture { param: "points", group: "points", kind: FieldKind::Integer },
    ])
    .scans(&[REASON])
    .hint("לניהול נקודות כתוב: הוסף <מספר> נקודות ללקוח <מספר לקוח> [סיבה: <סיבה>]"),
    // ── Action: shipping and payments ───────────────────────────
    Rule::new(
        Operation::Action(ActionOp::AddShippingMethod),
        &["שיטת משלוח"],
        r"שם\s*:\s*(?P<title>[^,]+?)\s*,\s*מחיר\s*:\s*(?P<cost>[0-9]+(?:\.[0-9]+)?)",
    )
    .captures(&[
        Capture { param: "title", group: "title", kind: FieldKind::Text },
        Capture { param: "cost", group: "cost", kind: FieldKind::Number },
    ])
    .scans(&[
        Scan {
            param: "zone_id",
            pattern: r"אזור\s*(?:מספר\s*)?:?\s*(?P<v>[0-9]+)",
            kind: FieldKind::Integer,
            fallback: Fallback::Required,
        },
        Scan {
            param: "method_id",
            pattern: r"סוג\s*:\s*(?P<v>[a-z_]+)",
            kind: FieldKind::Text,
            fallback: Fallback::Omit,
        },
    ])
    .hint("להוספת שיטת משלוח כתוב: הוסף שיטת משלוח שם: <שם>, מחיר: <מחיר>, אזור <מספר> [, סוג: flat_rate]"),
    Rule::new(Operation::Action(ActionOp::CreateShippingZone), &["אזור משלוח"], r"שם\s*:\s*(?P<name>[^,]+)")
        .captures(&[Capture { param: "name", group: "name", kind: FieldKind::Text }])
        .scans(&[
            Scan {
                param: "regions",
                pattern: r"אזורים\s*:\s*(?P<v>[^,]+)",
                kind: FieldKind::List(";"),
                fallback: Fallback::Omit,
            },
            Scan {
                param: "price",
                pattern: r"מחיר\s*:\s*(?P<v>[0-9]+(?:\.[0-9]+)?)",
                kind: FieldKind::Number,
                fallback: Fallback::Omit,
            },
        ])
        .hint("להוספת אזור משלוח כתוב: הוסף אזור משלוח שם: <שם>[, אזורים: IL;PS][, מחיר: <מחיר>]"),
    Rule::new(
        Operation::Action(ActionOp::AddPaymentMethod),
        &["שיטת תשלום", "אפשרות תשלום"],
        r"(?:שיטת|אפשרות)\s+תשלום\s+(?P<title>[^,]+)",
    )
    .captures(&[Capture { param: "title", group: "title", kind: FieldKind::Text }])
    .scans(&[Scan {
        param: "description",
        pattern: r"תיאור\s*:\s*(?P<v>.+)$",
        kind: FieldKind::Text,
        fallback: Fallback::Omit,
    }])
    .hint("להוספת שיטת תשלום כתוב: הוסף שיטת תשלום <שם>[, תיאור: <תיאור>]"),
    // ── Action: products ────────────────────────────────────────
    // Creation is tried before the description and category rules, whose
    // triggers also occur in add-product commands.
    Rule::new(
        Operation::Action(ActionOp::CreateProduct),
        &["הוסף מוצר", "צור מוצר", "יוצר מוצר"],
        r"בשם\s+(?P<name>[^0-9]+?)\s+במחיר\s+(?P<regular_price>[0-9]+(?:\.[0-9]+)?)",
    )
    .captures(&[
        Capture { param: "name", group: "name", kind: FieldKind::Text },
        Capture { param: "regular_price", group: "regular_price", kind: FieldKind::NumericText },
    ])
    .fixed(&[("type", Literal::Text("simple")), ("stock_status", Literal::Text("instock"))])
    .hint("להוספת מוצר כתוב: הוסף מוצר חדש בשם <שם> במחיר <מחיר>"),
    Rule::new(
        Operation::Action(ActionOp::UpdateStockQuantity),
        &["כמות מלאי", "כמות במלאי"],
        r"מוצר\s+(?P<product_name>.+?)\s+ל-?\s*(?P<quantity>[0-9]+)",
    )
    .captures(&[PRODUCT_NAME, Capture { param: "quantity", group: "quantity", kind: FieldKind::Integer }])
    .hint("לעדכון כמות כתוב: עדכן כמות מלאי למוצר <שם> ל-<כמות>"),
    Rule::new(
        Operation::Action(ActionOp::SetLowStockThreshold),
        &["מלאי נמוך", "התראת מלאי"],
        r"מוצר\s+(?P<product_name>.+?)\s+ל-?\s*(?P<threshold>[0-9]+)",
    )
    .captures(&[PRODUCT_NAME, Capture { param: "threshold", group: "threshold", kind: FieldKind::Integer }])
    .hint("להגדרת התראה כתוב: הגדר התראת מלאי נמוך למוצר <שם> ל-<כמות>"),
    Rule::new(
        Operation::Action(ActionOp::UpdateProductPrice),
        &["עדכן מחיר", "שנה מחיר", "עדכן את המחיר", "שנה את המחיר"],
        r#"(?:מוצר|של)\s+(?P<product_name>.+?)\s+ל-?\s*(?P<price>[0-9]+(?:\.[0-9]+)?)\s*(?:₪|שקל|ש"ח)?\s*$"#,
    )
    .captures(&[PRODUCT_NAME, Capture { param: "price", group: "price", kind: FieldKind::NumericText }])
    .hint("לעדכון מחיר כתוב: עדכן מחיר למוצר <שם> ל-<מחיר>"),
    Rule::new(
        Operation::Action(ActionOp::UpdateProductStock),
        &["עדכן מלאי", "עדכן סטטוס מלאי", "עדכן את המלאי"],
        r"מוצר\s+(?P<product_name>.+?)\s+ל-?\s*(?P<stock_status>במלאי|אזל|בהזמנה מראש)",
    )
    .captures(&[
        PRODUCT_NAME,
        Capture { param: "stock_status", group: "stock_status", kind: FieldKind::Choice(STOCK_STATUSES) },
    ])
    .hint("לעדכון מלאי כתוב: עדכן מלאי למוצר <שם> ל<במלאי|אזל|בהזמנה מראש>"),
    Rule::new(
        Operation::Action(ActionOp::UpdateProductName),
        &["שנה שם", "עדכן שם", "שנה את שם"],
        r"שם\s+(?:ה)?מוצר\s+(?P<old_name>.+)\s+ל-?(?P<new_name>\S.*)$",
    )
    .captures(&[
        Capture { param: "old_name", group: "old_name", kind: FieldKind::Text },
        Capture { param: "new_name", group: "new_name", kind: FieldKind::Text },
    ])
    .hint("לשינוי שם כתוב: שנה שם מוצר <שם נוכחי> ל<שם חדש>"),
    Rule::new(
        Operation::Action(ActionOp::UpdateProductDescription),
        &["תיאור"],
        r"מוצר\s+(?P<product_name>[^:]+?)\s*:\s*(?P<description>.+)$",
    )
    .captures(&[
        PRODUCT_NAME,
        Capture { param: "description", group: "description", kind: FieldKind::Text },
    ])
    .hint("לעדכון תיאור כתוב: עדכן תיאור למוצר <שם>: <תיאור חדש>"),
    Rule::new(
        Operation::Action(ActionOp::UpdateProductCategory),
        &["קטגוריה"],
        r"מוצר\s+(?P<product_name>.+?)\s+(?:ל|ב)?קטגוריה\s+(?P<category_name>[^,.]+)",
    )
    .captures(&[
        PRODUCT_NAME,
        Capture { param: "category_name", group: "category_name", kind: FieldKind::Text },
    ])
    .hint("לשיוך לקטגוריה כתוב: הוסף את המוצר <שם> לקטגוריה <קטגוריה>"),
    Rule::new(
        Operation::Action(ActionOp::DeleteProduct),
        &["מחק מוצר", "הסר מוצר", "מחק את המוצר", "הסר את המוצר"],
        r"(?:מחק|הסר)\s+(?:את\s+)?(?:ה)?מוצר\s+(?P<product_name>.+)$",
    )
    .captures(&[PRODUCT_NAME])
    .hint("למחיקת מוצר כתוב: מחק מוצר <שם>"),
    // ── Action: coupons ─────────────────────────────────────────
    Rule::new(
        Operation::Action(ActionOp::CreateCoupon),
        &["קופון"],
        r#"(?P<amount>[0-9]+(?:\.[0-9]+)?)\s*(?P<unit>אחוז|%|שקלים|שקל|ש"ח|₪)"#,
    )
    .captures(&[
        Capture { param: "amount", group: "amount", kind: FieldKind::Number },
        Capture { param: "discount_type", group: "unit", kind: FieldKind::Choice(COUPON_UNITS) },
    ])
    .scans(&[Scan {
        param: "code",
        pattern: r"קוד(?:\s+קופון)?\s*:?\s*(?P<v>[A-Za-z0-9_-]+)",
        kind: FieldKind::Text,
        fallback: Fallback::Generate(Generator::CouponCode),
    }])
    .hint("ליצירת קופון כתוב: צור קופון של <מספר> אחוז או <מספר> שקל [קוד קופון <קוד>]"),
    // ── Research ────────────────────────────────────────────────
    Rule::new(Operation::Research(ResearchOp::AnalyzeCompetitors), &["מתחרים", "השוואה"], "")
        .scans(&[MARKET_SEGMENT]),
    Rule::new(Operation::Research(ResearchOp::GetMarketTrends), &["טרנד", "מגמות"], "").scans(&[MARKET_SEGMENT]),
    Rule::new(Operation::Research(ResearchOp::GetRecommendations), &["המלצ"], "").scans(&[MARKET_SEGMENT]),
];
