//! Static landing page content and its vertical layout in page pixels.

pub struct Card {
    pub title: &'static str,
    /// Byline for testimonials, empty otherwise.
    pub byline: &'static str,
    pub body: &'static str,
    pub bullets: &'static [&'static str],
}

pub struct Section {
    pub id: &'static str,
    pub heading: &'static str,
    pub lead: &'static str,
    pub cards: &'static [Card],
}

pub const BRAND: &str = "NETiX";
pub const TAGLINE: &str = "NETWORK INFRASTRUCTURE MONITORING";
pub const SCROLL_HINT: &str = "Scroll to explore";
/// Height of the fixed header; navigation jumps land just below it.
pub const HEADER_HEIGHT: f32 = 80.0;

/// (label, section id) in header order.
pub const NAV_LINKS: [(&str, &str); 4] = [
    ("Solutions", "solutions"),
    ("Features", "features"),
    ("Platform", "platform"),
    ("Testimonials", "testimonials"),
];

const fn card(title: &'static str, body: &'static str, bullets: &'static [&'static str]) -> Card {
    Card {
        title,
        byline: "",
        body,
        bullets,
    }
}

const fn quote(name: &'static str, byline: &'static str, body: &'static str) -> Card {
    Card {
        title: name,
        byline,
        body,
        bullets: &[],
    }
}

pub const SECTIONS: &[Section] = &[
    Section {
        id: "hero",
        heading: "Network Infrastructure Monitoring",
        lead: "NETiX delivers comprehensive network monitoring and management solutions to help businesses \
               optimize, scale, and succeed in today's digital landscape.",
        cards: &[],
    },
    Section {
        id: "solutions",
        heading: "Our Solutions",
        lead: "Advanced network infrastructure monitoring solutions designed to ensure optimal performance, \
               security, and reliability.",
        cards: &[
            card(
                "Network Visibility",
                "Real-time monitoring and analytics for your entire network infrastructure with comprehensive dashboards.",
                &["End-to-end visibility", "Performance metrics", "Custom alerting"],
            ),
            card(
                "Network Security",
                "Proactive network security monitoring to identify and mitigate threats before they impact your business.",
                &["Anomaly detection", "Threat intelligence", "Automated remediation"],
            ),
            card(
                "Automation & Analytics",
                "Advanced analytics and automation to optimize network performance and reduce manual intervention.",
                &["Predictive analytics", "Automated workflows", "Custom reporting"],
            ),
        ],
    },
    Section {
        id: "features",
        heading: "Why Choose NETiX",
        lead: "Our network monitoring platform provides unmatched visibility, security, and control over your \
               entire network infrastructure.",
        cards: &[
            card(
                "AI-Powered Monitoring",
                "Machine learning algorithms that detect patterns, predict issues, and provide actionable insights \
                 for network optimization.",
                &[],
            ),
            card(
                "Real-Time Alerts",
                "Instant notifications about network issues through multiple channels, allowing for rapid response \
                 and minimal downtime.",
                &[],
            ),
            card(
                "Scalable Architecture",
                "Designed to grow with your network, from small businesses to large enterprises with complex \
                 multi-site deployments.",
                &[],
            ),
        ],
    },
    Section {
        id: "platform",
        heading: "Our Platform",
        lead: "A comprehensive network monitoring solution that provides complete visibility and control",
        cards: &[
            card(
                "Key Features",
                "",
                &[
                    "Unified dashboard for all network devices",
                    "Automated device discovery and mapping",
                    "Performance metrics and bandwidth analysis",
                    "Customizable alerts and notifications",
                    "Historical data and trend analysis",
                    "API integration with existing tools",
                ],
            ),
            card(
                "Supported Technologies",
                "",
                &[
                    "Wired and wireless networks",
                    "Routers, switches, and access points",
                    "Cloud infrastructure monitoring",
                    "SD-WAN and VPN connections",
                    "IoT device monitoring",
                    "Multi-vendor environment support",
                ],
            ),
        ],
    },
    Section {
        id: "testimonials",
        heading: "What Our Clients Say",
        lead: "Hear from organizations that have transformed their operations with NETiX solutions.",
        cards: &[
            quote(
                "Alex Chen",
                "CTO, TechGlobal Inc.",
                "\"NETiX's network monitoring platform has given us unprecedented visibility into our infrastructure. \
                 We've reduced network downtime by 85% and can now proactively address issues before they impact \
                 our operations.\"",
            ),
            quote(
                "Sarah Johnson",
                "CEO, Innovate Solutions",
                "\"With NETiX's monitoring solution, we've gained complete visibility across our multi-site network. \
                 The automated alerts and intuitive dashboards have made managing our complex infrastructure \
                 significantly easier.\"",
            ),
            quote(
                "Michael Rodriguez",
                "CISO, SecureBank",
                "\"NETiX's network security monitoring identified and prevented a potential data breach that our \
                 previous tools missed. The real-time alerts and automated remediation capabilities are \
                 game-changers.\"",
            ),
        ],
    },
    Section {
        id: "footer",
        heading: "NETiX",
        lead: "Advanced network monitoring solutions for complete visibility and control.",
        cards: &[
            card(
                "Solutions",
                "",
                &["Network Visibility", "Network Security", "Monitoring Platform"],
            ),
            card("Company", "", &["About Us", "Careers", "Blog", "Contact"]),
            card(
                "Legal",
                "",
                &["Privacy Policy", "Terms of Service", "Cookie Policy"],
            ),
        ],
    },
];

const SECTION_PADDING: f32 = 96.0;
const HEADING_HEIGHT: f32 = 140.0;
const CARD_ROW_HEIGHT: f32 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Heading,
    Card(usize),
}

/// One revealable block of the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageElement {
    pub section: usize,
    pub kind: ElementKind,
    pub top: f32,
    pub bottom: f32,
    /// Column within its card row, and how many columns the row has.
    pub column: usize,
    pub columns: usize,
}

impl PageElement {
    pub fn section(&self) -> &'static Section {
        &SECTIONS[self.section]
    }

    /// Elements of the solutions section reveal earlier and only once armed.
    pub fn in_solutions(&self) -> bool {
        self.section().id == "solutions"
    }

    pub fn text(&self) -> String {
        let section = self.section();
        match self.kind {
            ElementKind::Heading => format!("{}\n{}", section.heading, section.lead),
            ElementKind::Card(i) => {
                let card = &section.cards[i];
                let mut text = card.title.to_string();
                for line in [card.byline, card.body] {
                    if !line.is_empty() {
                        text.push('\n');
                        text.push_str(line);
                    }
                }
                for bullet in card.bullets {
                    text.push_str("\n- ");
                    text.push_str(bullet);
                }
                text
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct PageLayout {
    pub elements: Vec<PageElement>,
    pub height: f32,
    section_tops: Vec<f32>,
}

impl PageLayout {
    /// Stacks the sections top to bottom. The hero fills most of the first
    /// screen; every other section is a heading followed by one row of cards.
    pub fn new(viewport_height: f32) -> PageLayout {
        let mut elements = Vec::new();
        let mut section_tops = Vec::with_capacity(SECTIONS.len());
        let mut y = HEADER_HEIGHT;

        for (index, section) in SECTIONS.iter().enumerate() {
            section_tops.push(y);
            let section_start = y;
            y += SECTION_PADDING;
            if index == 0 {
                y = section_start.max(viewport_height * 0.8 - HEADING_HEIGHT);
            }
            elements.push(PageElement {
                section: index,
                kind: ElementKind::Heading,
                top: y,
                bottom: y + HEADING_HEIGHT,
                column: 0,
                columns: 1,
            });
            y += HEADING_HEIGHT;

            if !section.cards.is_empty() {
                for c in 0..section.cards.len() {
                    elements.push(PageElement {
                        section: index,
                        kind: ElementKind::Card(c),
                        top: y,
                        bottom: y + CARD_ROW_HEIGHT,
                        column: c,
                        columns: section.cards.len(),
                    });
                }
                y += CARD_ROW_HEIGHT;
            }
            y += SECTION_PADDING;
        }

        PageLayout {
            elements,
            height: y,
            section_tops,
        }
    }

    pub fn section_top(&self, id: &str) -> Option<f32> {
        SECTIONS
            .iter()
            .position(|s| s.id == id)
            .map(|i| self.section_tops[i])
    }

    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.height - viewport_height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_ordered() {
        let layout = PageLayout::new(800.0);
        let cards: usize = SECTIONS.iter().map(|s| s.cards.len()).sum();
        assert_eq!(layout.elements.len(), SECTIONS.len() + cards);
        for pair in layout.elements.windows(2) {
            assert!(pair[0].top <= pair[1].top);
            assert!(pair[0].bottom > pair[0].top);
        }
        assert!(layout.height > layout.elements.last().unwrap().bottom);
    }

    #[test]
    fn nav_links_resolve() {
        let layout = PageLayout::new(800.0);
        let mut last = 0.0;
        for (_, id) in NAV_LINKS {
            let top = layout.section_top(id).unwrap();
            assert!(top > last);
            last = top;
        }
        assert!(layout.section_top("pricing").is_none());
    }

    #[test]
    fn card_text_includes_bullets() {
        let layout = PageLayout::new(800.0);
        let visibility = layout
            .elements
            .iter()
            .find(|e| e.in_solutions() && e.kind == ElementKind::Card(0))
            .unwrap();
        let text = visibility.text();
        assert!(text.starts_with("Network Visibility\n"));
        assert!(text.contains("- Custom alerting"));
    }
}
