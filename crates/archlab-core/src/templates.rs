//! Built-in architecture templates for quick-start generation.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Web,
    Mobile,
    Enterprise,
    Realtime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    /// Icon name understood by the dashboard
    pub icon: &'static str,
    pub category: TemplateCategory,
    pub description: &'static str,
    pub tech_stack: &'static [&'static str],
    pub requirements: &'static str,
    #[serde(serialize_with = "pairs_as_map")]
    pub constraints: &'static [(&'static str, &'static str)],
}

fn pairs_as_map<S: Serializer>(
    pairs: &&'static [(&'static str, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs.iter() {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

pub fn templates() -> &'static [Template] {
    TEMPLATES
}

pub fn template_by_id(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

static TEMPLATES: &[Template] = &[
    Template {
        id: "saas-platform",
        name: "SaaS Platform",
        icon: "Cloud",
        category: TemplateCategory::Web,
        description: "Multi-tenant web application with authentication, billing, and dashboards.",
        tech_stack: &["Next.js", "Node.js", "PostgreSQL", "Stripe", "Redis"],
        requirements: "Build a multi-tenant SaaS platform with the following features:\n\
- User authentication with email/password and OAuth (Google, GitHub)\n\
- Organization/workspace management with role-based access control\n\
- Subscription billing with multiple pricing tiers (Free, Pro, Enterprise)\n\
- Admin dashboard with analytics and user management\n\
- REST API for third-party integrations\n\
- Email notifications for account events",
        constraints: &[
            ("architecture", "Monolith with modular structure"),
            ("database", "PostgreSQL"),
            ("auth", "JWT with refresh tokens"),
        ],
    },
    Template {
        id: "ecommerce-store",
        name: "E-commerce Store",
        icon: "ShoppingCart",
        category: TemplateCategory::Web,
        description: "Full-featured online store with cart, checkout, and payment processing.",
        tech_stack: &["Next.js", "Node.js", "PostgreSQL", "Stripe", "Elasticsearch"],
        requirements: "Build an e-commerce platform with the following features:\n\
- Product catalog with categories, tags, and search functionality\n\
- Shopping cart with persistent storage\n\
- Checkout flow with multiple payment methods (Card, PayPal)\n\
- Order management and tracking\n\
- User accounts with order history and wishlists\n\
- Admin panel for inventory and order management\n\
- Product reviews and ratings",
        constraints: &[
            ("architecture", "Modular Monolith"),
            ("database", "PostgreSQL"),
            ("search", "Elasticsearch"),
            ("payments", "Stripe"),
        ],
    },
    Template {
        id: "realtime-chat",
        name: "Real-time Chat App",
        icon: "MessageCircle",
        category: TemplateCategory::Realtime,
        description: "WebSocket-based messaging with presence detection and notifications.",
        tech_stack: &["React", "Node.js", "Socket.io", "Redis", "MongoDB"],
        requirements: "Build a real-time chat application with the following features:\n\
- One-on-one and group messaging\n\
- Real-time message delivery with read receipts\n\
- User presence (online/offline/typing indicators)\n\
- Media file sharing (images, documents)\n\
- Push notifications for mobile and web\n\
- Message search and history\n\
- End-to-end encryption for private chats",
        constraints: &[
            ("architecture", "Event-Driven with WebSockets"),
            ("database", "MongoDB"),
            ("cache", "Redis for presence"),
            ("realtime", "Socket.io"),
        ],
    },
    Template {
        id: "rest-api-backend",
        name: "REST API Backend",
        icon: "Server",
        category: TemplateCategory::Enterprise,
        description: "Scalable microservices API with authentication and CRUD operations.",
        tech_stack: &["Node.js", "Express", "PostgreSQL", "Redis", "Docker"],
        requirements: "Build a RESTful API backend with the following features:\n\
- JWT-based authentication with refresh tokens\n\
- Role-based access control (Admin, User, Guest)\n\
- CRUD operations for core resources\n\
- Rate limiting and request throttling\n\
- API versioning (v1, v2)\n\
- Request validation and error handling\n\
- Swagger/OpenAPI documentation\n\
- Health checks and monitoring endpoints",
        constraints: &[
            ("architecture", "Microservices"),
            ("database", "PostgreSQL"),
            ("cache", "Redis"),
            ("containerization", "Docker"),
        ],
    },
    Template {
        id: "mobile-backend",
        name: "Mobile App Backend",
        icon: "Smartphone",
        category: TemplateCategory::Mobile,
        description: "Backend-for-Frontend (BFF) pattern optimized for iOS/Android apps.",
        tech_stack: &["Node.js", "GraphQL", "PostgreSQL", "Firebase", "S3"],
        requirements: "Build a mobile app backend with the following features:\n\
- GraphQL API optimized for mobile data fetching\n\
- User authentication with social login (Apple, Google, Facebook)\n\
- Push notification service (FCM for Android, APNS for iOS)\n\
- Image and file upload with CDN delivery\n\
- Offline-first data sync support\n\
- Device registration and session management\n\
- Analytics event tracking",
        constraints: &[
            ("architecture", "BFF (Backend for Frontend)"),
            ("api", "GraphQL"),
            ("database", "PostgreSQL"),
            ("storage", "S3"),
            ("notifications", "Firebase Cloud Messaging"),
        ],
    },
    Template {
        id: "blog-cms",
        name: "Blog / CMS",
        icon: "FileText",
        category: TemplateCategory::Web,
        description: "Content management system with admin panel and SEO optimization.",
        tech_stack: &["Next.js", "Node.js", "PostgreSQL", "Cloudinary", "Markdown"],
        requirements: "Build a blog/CMS platform with the following features:\n\
- Rich text editor with Markdown support\n\
- Media library with image optimization\n\
- SEO-friendly URLs and meta tags\n\
- Categories, tags, and content scheduling\n\
- Multi-author support with roles (Admin, Editor, Author)\n\
- Comments with moderation\n\
- RSS feed and sitemap generation\n\
- Draft/publish workflow",
        constraints: &[
            ("architecture", "Monolith"),
            ("database", "PostgreSQL"),
            ("rendering", "SSG with ISR"),
            ("media", "Cloudinary"),
        ],
    },
    Template {
        id: "iot-dashboard",
        name: "IoT Dashboard",
        icon: "Activity",
        category: TemplateCategory::Realtime,
        description: "Device monitoring platform with data collection and alerting.",
        tech_stack: &["React", "Node.js", "TimescaleDB", "MQTT", "Grafana"],
        requirements: "Build an IoT monitoring dashboard with the following features:\n\
- Device registration and management\n\
- Real-time telemetry data ingestion (MQTT/HTTP)\n\
- Time-series data storage and visualization\n\
- Threshold-based alerting with notifications\n\
- Historical data charts and analytics\n\
- Device grouping and fleet management\n\
- Firmware update management\n\
- API for external integrations",
        constraints: &[
            ("architecture", "Event-Driven Microservices"),
            ("database", "TimescaleDB (time-series)"),
            ("messaging", "MQTT"),
            ("visualization", "Grafana"),
        ],
    },
    Template {
        id: "social-platform",
        name: "Social Media Platform",
        icon: "Users",
        category: TemplateCategory::Web,
        description: "User profiles, feeds, posts, and social interactions.",
        tech_stack: &["React", "Node.js", "PostgreSQL", "Redis", "Elasticsearch"],
        requirements: "Build a social media platform with the following features:\n\
- User profiles with bio, avatar, and cover photo\n\
- News feed with algorithmic sorting\n\
- Posts with text, images, and videos\n\
- Like, comment, and share functionality\n\
- Follow/unfollow and friend connections\n\
- Direct messaging between users\n\
- Notifications for social activities\n\
- Hashtags and content discovery\n\
- Content moderation tools",
        constraints: &[
            ("architecture", "Microservices"),
            ("database", "PostgreSQL"),
            ("cache", "Redis for feeds"),
            ("search", "Elasticsearch"),
        ],
    },
];
