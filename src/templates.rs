//! Bilingual template bank for generated reports
//!
//! Every string carries an English and a Chinese rendering. The
//! `{category}` placeholder is replaced with the target category verbatim.

use crate::model::Language;

/// Placeholder substituted with the target category
pub const CATEGORY: &str = "{category}";

/// A bilingual template string
#[derive(Debug, Clone, Copy)]
pub struct Text {
    pub en: &'static str,
    pub zh: &'static str,
}

const fn t(en: &'static str, zh: &'static str) -> Text {
    Text { en, zh }
}

impl Text {
    pub fn pick(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::Zh => self.zh,
        }
    }

    pub fn fill(&self, language: Language, category: &str) -> String {
        self.pick(language).replace(CATEGORY, category)
    }
}

pub fn fill_all(texts: &[Text], language: Language, category: &str) -> Vec<String> {
    texts.iter().map(|t| t.fill(language, category)).collect()
}

// ============================================================================
// Palette
// ============================================================================

pub const PALETTE: [&str; 6] = ["#4F46E5", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4"];

// ============================================================================
// Template shapes
// ============================================================================

pub struct PersonaTemplate {
    pub id: &'static str,
    pub name: Text,
    pub description: Text,
    pub percentage: f64,
    pub age: Text,
    pub gender: Text,
    pub income: Text,
    pub occupation: Text,
    pub traits: &'static [Text],
    pub quotes: &'static [Text],
}

pub struct SegmentTemplate {
    pub name: Text,
    pub percentage: f64,
    pub details: &'static [Text],
    pub quotes: &'static [Text],
}

/// One row of an insight table. Tables map these numbers onto their own
/// columns (mentions, share, score).
pub struct RowTemplate {
    pub id: &'static str,
    pub title: Text,
    pub mentions: u32,
    pub share: f64,
    pub score: f64,
    pub details: Text,
    pub quotes: &'static [Text],
}

pub struct CompareTemplate {
    pub id: &'static str,
    pub dimension: Text,
    pub own: f64,
    pub competitor: f64,
    pub verdict: Text,
}

pub struct StarTemplate {
    pub stars: u8,
    pub percentage: f64,
    pub theme: Text,
}

// ============================================================================
// Summaries and labels
// ============================================================================

pub const PERSONA_SUMMARY: Text = t(
    "Four distinct buyer groups drive {category} reviews, led by daily power users.",
    "{category}的评论主要来自四类用户群体，其中日常重度用户占比最高。",
);

pub const SCENARIO_SUMMARY: Text = t(
    "{category} is used most on weekday mornings and at home, mostly as part of a daily routine.",
    "{category}最常在工作日早晨和家中使用，多数用户将其融入日常习惯。",
);

pub const LOVE_SUMMARY: Text = t(
    "Customers praise {category} for reliability and ease of use above all else.",
    "用户最认可{category}的可靠性和易用性。",
);

pub const UNMET_SUMMARY: Text = t(
    "The most frequent {category} complaints point to durability and battery gaps.",
    "{category}最常见的抱怨集中在耐用性和续航方面。",
);

pub const INTENT_SUMMARY: Text = t(
    "Price-to-value and brand trust are the strongest reasons to buy {category}.",
    "性价比和品牌信任是购买{category}的最主要原因。",
);

pub const RATING_SUMMARY: Text = t(
    "Most {category} reviews are 4 or 5 stars; low ratings cluster around defects.",
    "{category}的评论以四星和五星为主，低分评论多与产品缺陷有关。",
);

pub const OPPORTUNITY_SUMMARY: Text = t(
    "Closing the durability gap is the largest opportunity for {category}.",
    "提升耐用性是{category}最大的机会点。",
);

pub const COMPETITOR_LABEL: Text = t("Leading competitor {category}", "竞品{category}");

pub const COMPETITOR_SUMMARY: Text = t(
    "Your {category} leads on value and support but trails the competitor on build quality.",
    "您的{category}在性价比和售后服务上领先，但在做工品质上落后于竞品。",
);

pub const COMPETITOR_ADVANTAGES: &[Text] = &[
    t("Lower price for a comparable {category} feature set", "同等功能下{category}价格更低"),
    t("Faster customer support responses", "客服响应更快"),
];

pub const COMPETITOR_GAPS: &[Text] = &[
    t("Competitor {category} feels more premium in hand", "竞品{category}手感更高端"),
    t("Competitor offers a longer warranty", "竞品提供更长的保修期"),
];

pub const POSITIVE_THEMES: &[Text] = &[
    t("Works exactly as described", "与描述完全一致"),
    t("Great {category} for the price", "这个价位的{category}很超值"),
    t("Setup took minutes", "几分钟就能完成设置"),
];

pub const NEGATIVE_THEMES: &[Text] = &[
    t("Stopped working after a few weeks", "用了几周就坏了"),
    t("Battery drains faster than advertised", "续航比宣传的短"),
    t("Customer service was slow to respond", "客服回复太慢"),
];

// ============================================================================
// Personas
// ============================================================================

pub const PERSONAS: &[PersonaTemplate] = &[
    PersonaTemplate {
        id: "power-user",
        name: t("Daily {category} Power User", "{category}日常重度用户"),
        description: t(
            "Relies on {category} every day and notices every small flaw.",
            "每天都离不开{category}，对每个小缺陷都很敏感。",
        ),
        percentage: 35.0,
        age: t("25-34", "25-34岁"),
        gender: t("Mixed", "男女均衡"),
        income: t("Middle to high", "中高收入"),
        occupation: t("Office professional", "职场白领"),
        traits: &[
            t("Uses {category} several times a day", "每天多次使用{category}"),
            t("Reads spec sheets before buying", "购买前会仔细研究参数"),
        ],
        quotes: &[
            t("I use this {category} from morning to night.", "这款{category}我从早用到晚。"),
            t("Small annoyances add up when you use it this much.", "用得多了，小毛病也会变成大问题。"),
        ],
    },
    PersonaTemplate {
        id: "gift-buyer",
        name: t("{category} Gift Buyer", "{category}送礼用户"),
        description: t(
            "Buys {category} as a present and cares about packaging and brand.",
            "把{category}当作礼物购买，看重包装和品牌。",
        ),
        percentage: 25.0,
        age: t("35-44", "35-44岁"),
        gender: t("Mostly female", "女性为主"),
        income: t("High", "高收入"),
        occupation: t("Manager", "管理人员"),
        traits: &[
            t("Shops around holidays", "节假日集中购买"),
            t("Values premium packaging", "重视精美包装"),
        ],
        quotes: &[
            t("Bought this {category} for my husband and he loves it.", "给老公买的{category}，他非常喜欢。"),
        ],
    },
    PersonaTemplate {
        id: "budget-seeker",
        name: t("Value-Driven {category} Shopper", "{category}性价比用户"),
        description: t(
            "Compares many {category} listings and buys on price-to-value.",
            "会比较多款{category}，以性价比为首要标准。",
        ),
        percentage: 22.5,
        age: t("18-24", "18-24岁"),
        gender: t("Mostly male", "男性为主"),
        income: t("Low to middle", "中低收入"),
        occupation: t("Student", "学生"),
        traits: &[
            t("Waits for discounts", "等待促销再下单"),
            t("Writes detailed reviews", "喜欢写详细评价"),
        ],
        quotes: &[
            t("For this price the {category} is unbeatable.", "这个价格的{category}无可挑剔。"),
            t("Not perfect, but worth every cent.", "不完美，但物有所值。"),
        ],
    },
    PersonaTemplate {
        id: "first-timer",
        name: t("First-Time {category} Owner", "{category}新手用户"),
        description: t(
            "New to {category} and needs a gentle setup experience.",
            "第一次使用{category}，需要简单友好的上手体验。",
        ),
        percentage: 17.5,
        age: t("45+", "45岁以上"),
        gender: t("Mixed", "男女均衡"),
        income: t("Middle", "中等收入"),
        occupation: t("Retired or self-employed", "退休或自由职业"),
        traits: &[
            t("Relies on the manual", "依赖说明书"),
            t("Contacts support early", "遇到问题会先联系客服"),
        ],
        quotes: &[
            t("My first {category} and it was easy to set up.", "第一次用{category}，设置很简单。"),
        ],
    },
];

// ============================================================================
// Usage scenarios
// ============================================================================

pub const MOMENTS: &[SegmentTemplate] = &[
    SegmentTemplate {
        name: t("Weekday morning", "工作日早晨"),
        percentage: 38.0,
        details: &[t("Part of the morning routine with {category}", "早晨例行使用{category}")],
        quotes: &[t("First thing I grab every morning.", "每天早上第一件拿起的东西。")],
    },
    SegmentTemplate {
        name: t("Evening wind-down", "晚间放松"),
        percentage: 27.0,
        details: &[t("Used after work to relax", "下班后放松时使用")],
        quotes: &[t("Perfect for winding down at night.", "晚上放松时用正合适。")],
    },
    SegmentTemplate {
        name: t("Weekend leisure", "周末休闲"),
        percentage: 22.0,
        details: &[t("Longer {category} sessions on weekends", "周末使用{category}时间更长")],
        quotes: &[],
    },
    SegmentTemplate {
        name: t("Travel", "出行途中"),
        percentage: 13.0,
        details: &[t("Taken along on trips", "出差旅行随身携带")],
        quotes: &[t("Fits easily in my carry-on.", "放进随身行李毫不费力。")],
    },
];

pub const LOCATIONS: &[SegmentTemplate] = &[
    SegmentTemplate {
        name: t("Home", "家中"),
        percentage: 52.0,
        details: &[t("Living room and bedroom use of {category}", "在客厅和卧室使用{category}")],
        quotes: &[t("It lives on my nightstand.", "一直放在我的床头柜上。")],
    },
    SegmentTemplate {
        name: t("Office", "办公室"),
        percentage: 24.0,
        details: &[t("Used at the desk during work hours", "工作时间在办公桌使用")],
        quotes: &[],
    },
    SegmentTemplate {
        name: t("Commute", "通勤途中"),
        percentage: 15.0,
        details: &[t("On trains and buses", "在地铁和公交上使用")],
        quotes: &[t("Great on my daily commute.", "每天通勤都很好用。")],
    },
    SegmentTemplate {
        name: t("Outdoors", "户外"),
        percentage: 9.0,
        details: &[t("Parks, gyms and hiking trails", "公园、健身房和徒步路线")],
        quotes: &[],
    },
];

pub const BEHAVIORS: &[SegmentTemplate] = &[
    SegmentTemplate {
        name: t("Daily habit", "日常习惯"),
        percentage: 41.0,
        details: &[t("{category} used every day without thinking", "每天自然而然地使用{category}")],
        quotes: &[t("I can't imagine my day without it.", "离不开它了。")],
    },
    SegmentTemplate {
        name: t("Task-driven", "任务驱动"),
        percentage: 29.0,
        details: &[t("Picked up for a specific job", "为了完成特定任务而使用")],
        quotes: &[],
    },
    SegmentTemplate {
        name: t("Shared with family", "与家人共用"),
        percentage: 18.0,
        details: &[t("Several household members use one {category}", "多位家庭成员共用一台{category}")],
        quotes: &[t("The whole family fights over it.", "全家人都抢着用。")],
    },
    SegmentTemplate {
        name: t("Occasional", "偶尔使用"),
        percentage: 12.0,
        details: &[t("Used a few times a month", "每月使用几次")],
        quotes: &[],
    },
];

// ============================================================================
// Insight tables
// ============================================================================

pub const LOVE_ROWS: &[RowTemplate] = &[
    RowTemplate {
        id: "love-reliability",
        title: t("Reliable {category} performance", "{category}性能稳定"),
        mentions: 1284,
        share: 32.0,
        score: 88.0,
        details: t("Reviewers repeatedly say it just works.", "评论者反复提到产品很稳定。"),
        quotes: &[
            t("Never had a single issue with this {category}.", "这款{category}从来没出过问题。"),
            t("Rock solid after six months.", "用了半年依然很稳定。"),
        ],
    },
    RowTemplate {
        id: "love-ease",
        title: t("Easy to use", "简单易用"),
        mentions: 976,
        share: 24.5,
        score: 81.0,
        details: t("Setup and daily use need no manual.", "安装和日常使用都无需看说明书。"),
        quotes: &[t("Took it out of the box and it worked.", "开箱即用。")],
    },
    RowTemplate {
        id: "love-design",
        title: t("Attractive design", "外观设计好看"),
        mentions: 702,
        share: 17.5,
        score: 74.0,
        details: t("Looks more expensive than it is.", "看起来比实际价格更贵。"),
        quotes: &[t("Friends asked where I bought this {category}.", "朋友都问我这款{category}在哪买的。")],
    },
    RowTemplate {
        id: "love-value",
        title: t("Good value", "物有所值"),
        mentions: 611,
        share: 15.0,
        score: 69.0,
        details: t("Compared favourably with pricier brands.", "与更贵的品牌相比毫不逊色。"),
        quotes: &[],
    },
    RowTemplate {
        id: "love-support",
        title: t("Helpful customer service", "客服热情"),
        mentions: 433,
        share: 11.0,
        score: 58.0,
        details: t("Replacements arrived quickly.", "换货很快就到了。"),
        quotes: &[t("Support replaced my {category} in two days.", "客服两天就给我换了新的{category}。")],
    },
];

pub const UNMET_ROWS: &[RowTemplate] = &[
    RowTemplate {
        id: "need-durability",
        title: t("Longer-lasting {category}", "更耐用的{category}"),
        mentions: 842,
        share: 34.0,
        score: 86.0,
        details: t("Failures cluster around the third month.", "故障多集中在第三个月左右。"),
        quotes: &[
            t("Died right after the return window closed.", "刚过退货期就坏了。"),
            t("Wish this {category} was built to last.", "希望这款{category}能更耐用。"),
        ],
    },
    RowTemplate {
        id: "need-battery",
        title: t("Better battery life", "更长的续航"),
        mentions: 655,
        share: 26.0,
        score: 72.0,
        details: t("Actual runtime falls short of the listing.", "实际续航低于宣传。"),
        quotes: &[t("Needs charging twice a day.", "一天要充两次电。")],
    },
    RowTemplate {
        id: "need-instructions",
        title: t("Clearer instructions", "更清晰的说明书"),
        mentions: 389,
        share: 16.0,
        score: 47.0,
        details: t("First-time owners struggle with setup.", "新手用户设置时遇到困难。"),
        quotes: &[],
    },
    RowTemplate {
        id: "need-accessories",
        title: t("More {category} accessories", "更多{category}配件"),
        mentions: 301,
        share: 13.0,
        score: 41.0,
        details: t("Buyers want spare parts and cases.", "用户希望有备用配件和保护套。"),
        quotes: &[t("Can't find a case that fits.", "找不到合适的保护套。")],
    },
    RowTemplate {
        id: "need-colors",
        title: t("More colour options", "更多颜色选择"),
        mentions: 214,
        share: 11.0,
        score: 28.0,
        details: t("Requests for darker and pastel finishes.", "用户希望有深色和马卡龙色。"),
        quotes: &[],
    },
];

pub const INTENT_ROWS: &[RowTemplate] = &[
    RowTemplate {
        id: "intent-value",
        title: t("Price-to-value", "性价比"),
        mentions: 1102,
        share: 36.0,
        score: 84.0,
        details: t("Buyers compare {category} prices across stores.", "用户会在多个平台比较{category}价格。"),
        quotes: &[t("Cheapest decent {category} I found.", "这是我找到的最便宜的好用{category}。")],
    },
    RowTemplate {
        id: "intent-brand",
        title: t("Brand trust", "品牌信任"),
        mentions: 820,
        share: 27.0,
        score: 76.0,
        details: t("Previous good experience with the brand.", "之前对品牌有良好体验。"),
        quotes: &[t("Third product from this brand.", "这是我买的第三款该品牌产品。")],
    },
    RowTemplate {
        id: "intent-reviews",
        title: t("Positive reviews", "好评推荐"),
        mentions: 590,
        share: 19.0,
        score: 63.0,
        details: t("Star rating decided the purchase.", "星级评分决定了购买。"),
        quotes: &[],
    },
    RowTemplate {
        id: "intent-replacement",
        title: t("Replacing an old {category}", "替换旧的{category}"),
        mentions: 548,
        share: 18.0,
        score: 39.0,
        details: t("Previous device broke or aged out.", "旧设备损坏或老化。"),
        quotes: &[t("My old {category} finally gave up.", "我的旧{category}终于坏了。")],
    },
];

pub const OPPORTUNITY_ROWS: &[RowTemplate] = &[
    RowTemplate {
        id: "opp-durability",
        title: t("Extend {category} durability", "提升{category}耐用性"),
        mentions: 842,
        share: 30.0,
        score: 92.0,
        details: t("Targets the top unmet need and the main driver of 1-star reviews.", "针对最主要的未满足需求，也是一星评论的主要原因。"),
        quotes: &[t("I would pay more for one that lasts.", "如果更耐用，我愿意多花钱。")],
    },
    RowTemplate {
        id: "opp-battery",
        title: t("Larger battery option", "大容量电池版本"),
        mentions: 655,
        share: 25.0,
        score: 78.0,
        details: t("A premium variant for power users.", "面向重度用户推出高端版本。"),
        quotes: &[],
    },
    RowTemplate {
        id: "opp-onboarding",
        title: t("Guided onboarding", "新手引导"),
        mentions: 389,
        share: 20.0,
        score: 55.0,
        details: t("Video setup guide for first-time {category} owners.", "为{category}新手提供视频设置指南。"),
        quotes: &[t("A quick video would have saved me an hour.", "有个简短视频就能帮我省下一个小时。")],
    },
    RowTemplate {
        id: "opp-bundle",
        title: t("Gift bundle", "礼盒套装"),
        mentions: 276,
        share: 15.0,
        score: 44.0,
        details: t("Premium packaging aimed at gift buyers.", "面向送礼用户的精美包装。"),
        quotes: &[],
    },
    RowTemplate {
        id: "opp-accessories",
        title: t("{category} accessory line", "{category}配件系列"),
        mentions: 301,
        share: 10.0,
        score: 33.0,
        details: t("Cases, straps and spare parts.", "保护套、配件和备用零件。"),
        quotes: &[],
    },
];

// ============================================================================
// Star rating
// ============================================================================

/// Fixed rating distribution, 5 stars down to 1
pub const STARS: &[StarTemplate] = &[
    StarTemplate { stars: 5, percentage: 45.0, theme: t("Exceeded expectations", "超出预期") },
    StarTemplate { stars: 4, percentage: 30.0, theme: t("Solid {category}, minor nitpicks", "{category}不错，有小瑕疵") },
    StarTemplate { stars: 3, percentage: 15.0, theme: t("Average experience", "体验一般") },
    StarTemplate { stars: 2, percentage: 7.0, theme: t("Quality concerns", "质量问题") },
    StarTemplate { stars: 1, percentage: 3.0, theme: t("Defective on arrival", "到货即损坏") },
];

/// Mock review total the rating counts are derived from
pub const MOCK_TOTAL_REVIEWS: u32 = 1000;

// ============================================================================
// Competitive comparison
// ============================================================================

pub const COMPARISON_ROWS: &[CompareTemplate] = &[
    CompareTemplate {
        id: "cmp-value",
        dimension: t("Price-to-value", "性价比"),
        own: 82.0,
        competitor: 64.0,
        verdict: t("Ahead", "领先"),
    },
    CompareTemplate {
        id: "cmp-quality",
        dimension: t("Build quality", "做工品质"),
        own: 61.0,
        competitor: 78.0,
        verdict: t("Behind", "落后"),
    },
    CompareTemplate {
        id: "cmp-support",
        dimension: t("Customer support", "售后服务"),
        own: 75.0,
        competitor: 58.0,
        verdict: t("Ahead", "领先"),
    },
    CompareTemplate {
        id: "cmp-design",
        dimension: t("{category} design", "{category}外观"),
        own: 70.0,
        competitor: 71.0,
        verdict: t("On par", "持平"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_substitutes_every_placeholder() {
        let text = t("{category} and {category}", "{category}和{category}");
        assert_eq!(text.fill(Language::En, "Kettle"), "Kettle and Kettle");
        assert_eq!(text.fill(Language::Zh, "Kettle"), "Kettle和Kettle");
    }

    #[test]
    fn test_persona_shares_sum_to_100() {
        let total: f64 = PERSONAS.iter().map(|p| p.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_groups_sum_to_100() {
        for group in [MOMENTS, LOCATIONS, BEHAVIORS] {
            let total: f64 = group.iter().map(|s| s.percentage).sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_distribution_is_fixed() {
        let dist: Vec<(u8, f64)> = STARS.iter().map(|s| (s.stars, s.percentage)).collect();
        assert_eq!(dist, vec![(5, 45.0), (4, 30.0), (3, 15.0), (2, 7.0), (1, 3.0)]);
    }

    #[test]
    fn test_row_ids_are_unique_per_table() {
        for rows in [LOVE_ROWS, UNMET_ROWS, INTENT_ROWS, OPPORTUNITY_ROWS] {
            let mut ids: Vec<&str> = rows.iter().map(|r| r.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), rows.len());
        }
    }
}
