//! Literal request data shared by the endpoint catalog.

pub const BLOG_IDEAS_TOPIC: &str = "Artificial Intelligence in Copywriting";
pub const BLOG_IDEAS_KEYWORD: &str = "test";
pub const BLOG_IDEAS_SPECIAL_TOPIC: &str = "AI & Machine Learning: Future-Proof Solutions!";
pub const BLOG_IDEAS_SPECIAL_KEYWORD: &str = "AI solutions";

pub const BLOG_INTROS_TITLE: &str = "The Impact of Artificial Intelligence on Modern Business";
pub const BLOG_INTROS_DESCRIPTION: &str =
    "Exploring how AI is transforming various business sectors and operations";
pub const BLOG_INTROS_TONE: &str = "Professional";
pub const BLOG_INTROS_SPECIAL_TITLE: &str = "AI & ML: The Future of Content Creation! (2024 Update)";

pub const BLOG_OUTLINES_TITLE: &str =
    "How Artificial Intelligence Will Change The World Of Copywriting";
pub const BLOG_OUTLINES_INTRO: &str = "The possibilities of artificial intelligence (AI) seem \
endless. It's predicted that AI will soon have the ability to write articles, screen movies, and \
even drive cars on our behalf. But what about copywriting? Can AI be the next copywriter? I've \
spent the past few weeks doing some research and experimenting, and I've come up with a few ideas \
for how AI will change the world of copywriting.";
pub const BLOG_OUTLINES_SPECIAL_INTRO: &str =
    "In 2024 & beyond, AI will transform content creation! Here's why...";

pub const ARTICLE_TITLE: &str = "The Future of Artificial Intelligence";
pub const ARTICLE_INTRO: &str = "Exploring the transformative impact of AI on various industries";
pub const ARTICLE_SECTIONS: [&str; 3] = [
    "Current AI Applications",
    "Future Trends",
    "Ethical Considerations",
];
pub const ARTICLE_SPECIAL_TITLE: &str = "AI & ML: The Future!";
pub const ARTICLE_SPECIAL_INTRO: &str = "Let's explore the world of AI & ML!";
pub const ARTICLE_SPECIAL_SECTIONS: [&str; 2] = ["Current & Future", "Pros & Cons"];

pub const SSE_ARTICLE_TITLE: &str = "AI in copywriting";
pub const SSE_ARTICLE_INTRO: &str = "AI stands for Artificial Intelligence";
pub const SSE_ARTICLE_SECTIONS: [&str; 2] = ["Introduction to AI", "Advantages of AI"];

pub const PASSIVE_SENTENCE: &str = "The contract was cancelled by the studio managers. Hidden \
behind their stoic lawyers the messages were passed down. Words like iron clad and final notice \
were thrust into their faces. Voices were raised. Emotions were not kept in check. Fury rose \
unbridled.";

pub const REWRITE_LINK: &str = "https://www.bleepingcomputer.com/news/security/\
suncor-energy-cyberattack-impacts-petro-canada-gas-stations/";

pub const REWRITE_ENGINE: &str = "premium";
pub const REWRITE_NUM_COPIES: &str = "1";

pub const COMPANY_NAME: &str = "Writesonic";
pub const COMPANY_DESCRIPTION: &str = "Writesonic is an AI copywriting startup. helps compose \
high-performing landing pages, product descriptions, ads, and blog posts in seconds. 1000+ 5-star \
reviews.";

pub const CONCLUSION_ARTICLE: &str = "AI will be a big part of the future and will have a huge \
impact on our lives. Many companies are already investing in AI, and many other companies will \
follow suit. AI can automate many tasks that humans do, freeing up people to focus on other \
things. AI has the potential to be used for a variety of purposes, such as helping astronauts \
travel to Mars or automating financial transactions. While AI is still in its infancy, it holds a \
lot of promise for the future.\nIf you want to learn more about AI, check out some of these \
resources:\n-Artificial Intelligence by Peter Norvig:A book that discusses AI from a technical \
perspective.\n-What is Artificial Intelligence?:An article that provides an overview of AI.\n\
-Stanford University's Artificial Intelligence Page:A page with information about AI research at \
Stanford University";

pub const DEFINE_KEYWORD: &str = "Bouyancy";

pub const META_BLOG_DESCRIPTION: &str = "Your personal brand is your reputation and how people \
perceive you. What you say and do is part of the brand. Your brand identity is the sum of your \
personal brand and the perception of your company. It helps people understand who you are and \
what you have to offer. But how do you build a strong brand identity?Here are four steps to help \
you do that.";
pub const META_BLOG_TITLE: &str = "The 4 Steps To Building A Strong Personal Brand Identity";
pub const META_BLOG_SEARCH_TERM: &str = "How to build a personal brand";

pub const REWRITE_ARTICLE: &str = "Remove the friction from your morning by preparing the night \
before. Simple preparations like setting up your first work task and putting out the ingredients \
for a nutritious breakfast can go a long way.";
pub const REWRITE_KEYWORDS: &str = "healthy breakfast tip";

pub const YOUTUBE_TOPIC: &str = "How to make delicious pasta";
pub const YOUTUBE_TONE: &str = "friendly";
pub const YOUTUBE_LANGUAGE: &str = "en";

pub const INVALID_API_KEY: &str = "invalid-key";
pub const INVALID_TOKEN: &str = "invalid_token";
pub const INVALID_ENGINE: &str = "invalid_engine";
pub const INVALID_LANGUAGE: &str = "invalid_lang";

/// Longest input the API is expected to accept.
pub const LONG_INPUT_CHARS: usize = 500;
/// Length well past every endpoint's input limit.
pub const OVERSIZED_INPUT_CHARS: usize = 10_000;

pub fn repeated(ch: char, count: usize) -> String {
    std::iter::repeat(ch).take(count).collect()
}
