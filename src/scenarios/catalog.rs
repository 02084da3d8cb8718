use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::executor::{Method, DEFAULT_TIMEOUT_MS};

use super::{
    fixtures::*,
    model::{BodyShape, Endpoint, Expectation, Intent, Mutation, Scenario},
};

const CONTENT_PREFIX: &str = "/v2/business/content";
const JSON_CONTENT_TYPE: &str = "application/json";

static CATALOG: Lazy<Vec<Endpoint>> = Lazy::new(build_catalog);

/// Every content endpoint the suite knows about, in run order.
pub fn catalog() -> &'static [Endpoint] {
    &CATALOG
}

pub fn find_endpoint(name: &str) -> Option<&'static Endpoint> {
    catalog().iter().find(|endpoint| endpoint.name == name)
}

fn build_catalog() -> Vec<Endpoint> {
    vec![
        blog_ideas(),
        blog_intros(),
        blog_outlines(),
        ai_article_writer_v3(),
        ai_article_writer_v3_sse(),
        active_voice(),
        article_rewriter(),
        company_vision(),
        conclusion_writer(),
        define_this(),
        meta_blog(),
        rewrite_with_keywords(),
        youtube_intros(),
    ]
}

fn blog_ideas() -> Endpoint {
    let detail = BodyShape::ErrorDetail { contains: None };
    EndpointBuilder::post(
        "blog-ideas",
        json!({"topic": BLOG_IDEAS_TOPIC, "primary_keyword": BLOG_IDEAS_KEYWORD}),
    )
    .accepts_valid_request(BodyShape::JsonArray)
    .positive(
        "accepts a 500-character topic",
        vec![set("topic", repeated('A', LONG_INPUT_CHARS))],
        Expectation::shaped(200, BodyShape::JsonArray),
    )
    .positive(
        "accepts special characters in topic",
        vec![
            set("topic", BLOG_IDEAS_SPECIAL_TOPIC),
            set("primary_keyword", BLOG_IDEAS_SPECIAL_KEYWORD),
        ],
        Expectation::shaped(200, BodyShape::JsonArray),
    )
    .negative(
        "rejects empty topic",
        vec![set("topic", "")],
        Expectation::shaped(400, detail.clone()),
    )
    .negative(
        "rejects missing primary_keyword",
        vec![Mutation::RemoveField("primary_keyword")],
        Expectation::shaped(400, detail.clone()),
    )
    .negative(
        "rejects an invalid api key",
        vec![invalid_api_key()],
        Expectation::shaped(401, detail.clone()),
    )
    .negative(
        "rejects an invalid token",
        vec![Mutation::SetHeader("Authorization", INVALID_TOKEN.to_string())],
        Expectation::shaped(401, detail),
    )
    .rejects_oversized(&["topic"], 400)
    .rejects_invalid_query_params()
    .build()
}

fn blog_intros() -> Endpoint {
    EndpointBuilder::post(
        "blog-intros",
        json!({
            "blog_title": BLOG_INTROS_TITLE,
            "blog_description": BLOG_INTROS_DESCRIPTION,
            "tone_of_voice": BLOG_INTROS_TONE,
        }),
    )
    .accepts_valid_json_request(BodyShape::NonEmptyTexts)
    .accepts_special_characters(
        vec![set("blog_title", BLOG_INTROS_SPECIAL_TITLE)],
        BodyShape::ArrayOfTextItems,
    )
    .rejects_empty("blog_title", 400)
    .rejects_empty("blog_description", 400)
    .rejects_missing("blog_description", 400)
    .rejects_oversized(&["blog_title", "blog_description"], 400)
    .rejects_invalid_api_key()
    .rejects_invalid_query_params()
    .build()
}

fn blog_outlines() -> Endpoint {
    EndpointBuilder::post(
        "blog-outlines",
        json!({"blog_title": BLOG_OUTLINES_TITLE, "blog_intro": BLOG_OUTLINES_INTRO}),
    )
    .accepts_valid_json_request(BodyShape::BlogOutline { structured: true })
    .accepts_special_characters(
        vec![set("blog_intro", BLOG_OUTLINES_SPECIAL_INTRO)],
        BodyShape::BlogOutline { structured: false },
    )
    .rejects_empty("blog_title", 400)
    .rejects_empty("blog_intro", 400)
    .rejects_missing("blog_intro", 400)
    .rejects_oversized(&["blog_title", "blog_intro"], 400)
    .rejects_invalid_api_key()
    .rejects_invalid_query_params()
    .build()
}

fn ai_article_writer_v3() -> Endpoint {
    EndpointBuilder::post(
        "ai-article-writer-v3",
        json!({
            "article_title": ARTICLE_TITLE,
            "article_intro": ARTICLE_INTRO,
            "article_sections": ARTICLE_SECTIONS,
        }),
    )
    .accepts_valid_json_request(BodyShape::ArrayOfArticles)
    .accepts_special_characters(
        vec![
            set("article_title", ARTICLE_SPECIAL_TITLE),
            set("article_intro", ARTICLE_SPECIAL_INTRO),
            Mutation::SetField("article_sections", json!(ARTICLE_SPECIAL_SECTIONS)),
        ],
        BodyShape::ArrayOfArticles,
    )
    .rejects_empty("article_title", 400)
    .rejects_empty("article_intro", 400)
    .negative(
        "rejects empty article_sections",
        vec![Mutation::SetField("article_sections", json!([]))],
        Expectation::status(400),
    )
    .rejects_missing("article_sections", 400)
    .rejects_oversized(&["article_title", "article_intro"], 400)
    .rejects_invalid_api_key()
    .rejects_invalid_query_params()
    .build()
}

fn ai_article_writer_v3_sse() -> Endpoint {
    let data = json!({
        "article_title": SSE_ARTICLE_TITLE,
        "article_intro": SSE_ARTICLE_INTRO,
        "article_sections": SSE_ARTICLE_SECTIONS,
    });
    let mut builder = EndpointBuilder::get("ai-article-writer-v3-sse", "ai-article-writer-v3/sse")
        .query("data", data.to_string())
        .accepts_valid_request(BodyShape::ArrayOfTextItems);
    for (field, empty) in [
        ("article_title", json!("")),
        ("article_intro", json!("")),
        ("article_sections", json!([])),
    ] {
        builder = builder.negative(
            &format!("rejects empty {field} in data"),
            vec![Mutation::SetQueryJsonField {
                param: "data",
                field,
                value: empty,
            }],
            Expectation::status(400),
        );
    }
    builder
        .rejects_empty_query("engine")
        .rejects_empty_query("language")
        .rejects_invalid_api_key()
        .build()
}

fn active_voice() -> Endpoint {
    EndpointBuilder::post("active-voice", json!({"sentence": PASSIVE_SENTENCE}))
        .accepts_valid_request(BodyShape::ArrayOfTextItems)
        .rejects_empty("sentence", 400)
        .rejects_empty_default_query()
        .rejects_invalid_api_key()
        .build()
}

fn article_rewriter() -> Endpoint {
    EndpointBuilder::post("article-rewriter", json!({"link": REWRITE_LINK}))
        .query("engine", REWRITE_ENGINE.to_string())
        .query("num_copies", REWRITE_NUM_COPIES.to_string())
        .accepts_valid_request(BodyShape::ArrayOfTextItems)
        .rejects_empty("link", 422)
        .negative(
            "rejects an invalid link format",
            vec![Mutation::ReplaceBody(json!({"link": "not-a-valid-url"}))],
            Expectation::status(400),
        )
        .negative(
            "rejects missing link",
            vec![Mutation::ReplaceBody(json!({}))],
            Expectation::status(400),
        )
        .negative(
            "rejects an invalid engine parameter",
            vec![Mutation::SetQuery("engine", "invalid".to_string())],
            Expectation::status(422),
        )
        .negative(
            "rejects an invalid num_copies parameter",
            vec![Mutation::SetQuery("num_copies", "invalid".to_string())],
            Expectation::status(422),
        )
        .rejects_invalid_api_key()
        .build()
}

fn company_vision() -> Endpoint {
    EndpointBuilder::post(
        "company-vision",
        json!({"company_name": COMPANY_NAME, "company_description": COMPANY_DESCRIPTION}),
    )
    .accepts_valid_request(BodyShape::ArrayOfTextItems)
    .rejects_empty("company_name", 400)
    .rejects_empty("company_description", 400)
    .rejects_empty_default_query()
    .rejects_invalid_api_key()
    .build()
}

fn conclusion_writer() -> Endpoint {
    EndpointBuilder::post("conclusion-writer", json!({"article": CONCLUSION_ARTICLE}))
        .accepts_valid_request(BodyShape::ArrayOfTextItems)
        .rejects_empty("article", 400)
        .rejects_empty_default_query()
        .rejects_invalid_api_key()
        .build()
}

// 401 and 403 (insufficient balance) are accepted alongside 200.
fn define_this() -> Endpoint {
    EndpointBuilder::post("define-this", json!({"keyword": DEFINE_KEYWORD}))
        .positive(
            "accepts a valid request",
            Vec::new(),
            Expectation::shaped(200, BodyShape::ArrayOfTextItems)
                .or(401, BodyShape::Any)
                .or(
                    403,
                    BodyShape::ErrorDetail {
                        contains: Some("Insufficient balance"),
                    },
                ),
        )
        .negative(
            "rejects empty keyword",
            vec![set("keyword", "")],
            Expectation::status(400).or(401, BodyShape::Any),
        )
        .rejects_invalid_api_key()
        .build()
}

fn meta_blog() -> Endpoint {
    EndpointBuilder::post(
        "meta-blog",
        json!({
            "blog_description": META_BLOG_DESCRIPTION,
            "blog_title": META_BLOG_TITLE,
            "search_term": META_BLOG_SEARCH_TERM,
        }),
    )
    .accepts_valid_request(BodyShape::ArrayOfTextItems)
    .rejects_empty("blog_description", 400)
    .rejects_empty("blog_title", 400)
    .rejects_empty("search_term", 400)
    .rejects_empty_default_query()
    .rejects_invalid_api_key()
    .build()
}

fn rewrite_with_keywords() -> Endpoint {
    EndpointBuilder::post(
        "rewrite-with-keywords",
        json!({"article": REWRITE_ARTICLE, "keywords": REWRITE_KEYWORDS}),
    )
    .accepts_valid_request(BodyShape::ArrayOfTextItems)
    .rejects_empty("article", 400)
    .rejects_empty("keywords", 400)
    .rejects_empty_default_query()
    .rejects_invalid_api_key()
    .build()
}

fn youtube_intros() -> Endpoint {
    EndpointBuilder::post(
        "youtube-intros",
        json!({"topic": YOUTUBE_TOPIC, "tone": YOUTUBE_TONE, "language": YOUTUBE_LANGUAGE}),
    )
    .accepts_valid_request(BodyShape::ObjectWithDataArray)
    .rejects_empty("topic", 422)
    .negative(
        "rejects an invalid tone",
        vec![set("tone", "invalid")],
        Expectation::status(422),
    )
    .negative(
        "rejects an invalid language",
        vec![set("language", "xx")],
        Expectation::status(422),
    )
    .rejects_invalid_api_key()
    .build()
}

fn set(field: &'static str, value: impl Into<Value>) -> Mutation {
    Mutation::SetField(field, value.into())
}

fn invalid_api_key() -> Mutation {
    Mutation::SetHeader("X-API-KEY", INVALID_API_KEY.to_string())
}

/// Assembles an endpoint and its scenarios from the recurring scenario families.
struct EndpointBuilder {
    endpoint: Endpoint,
}

impl EndpointBuilder {
    fn post(name: &'static str, payload: Value) -> Self {
        Self::new(name, name, Method::Post, Some(payload))
    }

    fn get(name: &'static str, path: &'static str) -> Self {
        Self::new(name, path, Method::Get, None)
    }

    fn new(name: &'static str, path: &'static str, method: Method, payload: Option<Value>) -> Self {
        Self {
            endpoint: Endpoint {
                name,
                path: endpoint_path(path),
                method,
                payload,
                query: Vec::new(),
                scenarios: Vec::new(),
            },
        }
    }

    fn query(mut self, name: &'static str, value: String) -> Self {
        self.endpoint.query.push((name, value));
        self
    }

    fn scenario(
        mut self,
        name: &str,
        intent: Intent,
        mutations: Vec<Mutation>,
        expectation: Expectation,
    ) -> Self {
        self.endpoint.scenarios.push(Scenario {
            name: name.to_string(),
            intent,
            mutations,
            expectation,
        });
        self
    }

    fn positive(self, name: &str, mutations: Vec<Mutation>, expectation: Expectation) -> Self {
        self.scenario(name, Intent::Positive, mutations, expectation)
    }

    fn negative(self, name: &str, mutations: Vec<Mutation>, expectation: Expectation) -> Self {
        self.scenario(name, Intent::Negative, mutations, expectation)
    }

    /// The untouched request must succeed, and do so inside the dispatch timeout.
    fn accepts_valid_request(self, shape: BodyShape) -> Self {
        self.accepts(Expectation::shaped(200, shape))
    }

    /// Like `accepts_valid_request`, and the success must be served as JSON.
    fn accepts_valid_json_request(self, shape: BodyShape) -> Self {
        self.accepts(Expectation::shaped(200, shape).content_type(JSON_CONTENT_TYPE))
    }

    fn accepts(self, expectation: Expectation) -> Self {
        self.positive("accepts a valid request", Vec::new(), expectation)
            .positive(
                "responds within the timeout",
                Vec::new(),
                Expectation::status(200).within_ms(DEFAULT_TIMEOUT_MS),
            )
    }

    fn accepts_special_characters(self, mutations: Vec<Mutation>, shape: BodyShape) -> Self {
        self.positive(
            "accepts special characters",
            mutations,
            Expectation::shaped(200, shape),
        )
    }

    fn rejects_empty(self, field: &'static str, status: u16) -> Self {
        self.negative(
            &format!("rejects empty {field}"),
            vec![set(field, "")],
            Expectation::status(status),
        )
    }

    fn rejects_missing(self, field: &'static str, status: u16) -> Self {
        self.negative(
            &format!("rejects missing {field}"),
            vec![Mutation::RemoveField(field)],
            Expectation::status(status),
        )
    }

    fn rejects_oversized(self, fields: &[&'static str], status: u16) -> Self {
        let mutations = fields
            .iter()
            .zip(['A', 'B'].into_iter().cycle())
            .map(|(field, ch)| set(*field, repeated(ch, OVERSIZED_INPUT_CHARS)))
            .collect();
        self.negative(
            &format!("rejects {OVERSIZED_INPUT_CHARS}-character {}", fields.join(" and ")),
            mutations,
            Expectation::status(status),
        )
    }

    fn rejects_empty_query(self, param: &'static str) -> Self {
        self.negative(
            &format!("rejects empty {param} parameter"),
            vec![Mutation::SetQuery(param, String::new())],
            Expectation::status(400),
        )
    }

    fn rejects_empty_default_query(self) -> Self {
        self.rejects_empty_query("engine")
            .rejects_empty_query("language")
            .rejects_empty_query("num_copies")
    }

    fn rejects_invalid_api_key(self) -> Self {
        self.negative(
            "rejects an invalid api key",
            vec![invalid_api_key()],
            Expectation::status(401),
        )
    }

    fn rejects_invalid_query_params(self) -> Self {
        self.negative(
            "rejects invalid query parameters",
            vec![
                Mutation::SetQuery("engine", INVALID_ENGINE.to_string()),
                Mutation::SetQuery("language", INVALID_LANGUAGE.to_string()),
            ],
            Expectation::status(400),
        )
    }

    fn build(self) -> Endpoint {
        self.endpoint
    }
}

fn endpoint_path(path: &str) -> String {
    format!("{CONTENT_PREFIX}/{path}")
}
