//! Generates timesheet descriptions for when you need to dazzle.

use rand::Rng;
use rand::seq::IndexedRandom;

const VERBS: &[&str] = &[
    "aggregate", "architect", "benchmark", "cultivate", "deliver", "deploy", "drive", "embrace",
    "empower", "engineer", "enhance", "envision", "evolve", "expedite", "facilitate", "harness",
    "implement", "incubate", "innovate", "integrate", "iterate", "leverage", "maximize", "monetize",
    "optimize", "orchestrate", "productize", "redefine", "reinvent", "repurpose", "scale",
    "streamline", "synergize", "synthesize", "transform", "unleash", "utilize", "visualize",
    "whiteboard",
];

const ADJECTIVES: &[&str] = &[
    "24/7", "B2B", "back-end", "best-of-breed", "bleeding-edge", "cloud", "collaborative",
    "cross-platform", "customized", "cutting-edge", "distributed", "dynamic", "end-to-end",
    "enterprise", "extensible", "frictionless", "front-end", "global", "granular", "holistic",
    "innovative", "integrated", "intuitive", "mission-critical", "next-generation",
    "open-source", "out-of-the-box", "plug-and-play", "proactive", "real-time", "robust",
    "scalable", "seamless", "strategic", "synergistic", "turn-key", "user-centric", "value-added",
    "vertical", "world-class",
];

const NOUNS: &[&str] = &[
    "action-items", "ai", "applications", "architectures", "bandwidth", "channels", "content",
    "convergence", "deliverables", "experiences", "functionalities", "infrastructures",
    "initiatives", "interfaces", "machine learning", "markets", "methodologies", "metrics",
    "mindshare", "models", "networks", "paradigms", "partnerships", "platforms", "portals",
    "relationships", "ROI", "SaaS", "synergies", "schemas", "solutions", "supply-chains",
    "systems", "technologies", "users", "web services",
];

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// A "verb adjective noun" phrase where no word contains another.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    loop {
        let verb = VERBS.choose(rng).copied().unwrap_or("deliver");
        let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("robust");
        let noun = NOUNS.choose(rng).copied().unwrap_or("solutions");

        if !overlaps(verb, adjective) && !overlaps(verb, noun) && !overlaps(adjective, noun) {
            return format!("{verb} {adjective} {noun}");
        }
    }
}
