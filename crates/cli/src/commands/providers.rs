//! `sydia providers` — List supported LLM providers.

use sydia_core::provider::ProviderKind;

pub fn run() {
    println!("Supported providers");
    println!("===================");
    println!();
    println!("  {:<8} {:<52} {:<26} Embeddings", "Provider", "Default base URL", "Default model");
    for kind in ProviderKind::ALL {
        let embeddings = if matches!(kind, ProviderKind::Claude) { "no" } else { "yes" };
        println!(
            "  {:<8} {:<52} {:<26} {}",
            kind.name(),
            kind.default_base_url(),
            kind.default_model(),
            embeddings
        );
    }
    println!();
    println!("  Provider names are case-insensitive (\"OpenAI\" and \"openai\" are equal).");
    println!();
    println!("  Environment variables:");
    println!("    SYDIA_API_KEY, SYDIA_PROVIDER, SYDIA_MODEL, SYDIA_BASE_URL");
    println!("    SYDIA_EMBEDDING_API_KEY");
}
