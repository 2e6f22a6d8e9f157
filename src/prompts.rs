use rand::seq::SliceRandom;
use rand::Rng;

pub const DESIGN_ENHANCEMENT: &str = include_str!("../data/prompts/design_enhancement.txt");
pub const REFERENCE_CLAUSE: &str = include_str!("../data/prompts/reference_clause.txt");
pub const SAMPLE_PROMPTS: &str = include_str!("../data/prompts/sample_prompts.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Wrap the user's prompt in the generation instruction.
///
/// The reference-image clause, naming the exact image count, is only present
/// when at least one reference image accompanies the request.
pub fn enhance_prompt(prompt: &str, reference_count: usize) -> String {
    let reference_clause = if reference_count > 0 {
        let count = reference_count.to_string();
        format!(
            "{}\n\n",
            render(REFERENCE_CLAUSE, &[("count", &count)]).trim_end()
        )
    } else {
        String::new()
    };

    // The prompt goes in last so placeholders typed by the user stay literal.
    let template = render(DESIGN_ENHANCEMENT, &[("reference_clause", &reference_clause)]);
    render(&template, &[("prompt", prompt)])
}

/// Pick one of the built-in sample prompts.
pub fn random_sample_prompt<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let samples: Vec<&'static str> = SAMPLE_PROMPTS
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    samples.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_templates_have_placeholders() {
        assert!(DESIGN_ENHANCEMENT.contains("{{prompt}}"));
        assert!(DESIGN_ENHANCEMENT.contains("{{reference_clause}}"));
        assert!(REFERENCE_CLAUSE.contains("{{count}}"));
    }

    #[test]
    fn test_enhance_prompt_without_references_omits_clause() {
        let text = enhance_prompt("a quiet reading nook", 0);
        assert!(text.contains("User Request: a quiet reading nook"));
        assert!(text.contains("photorealistic"));
        assert!(text.contains("professional, well-lit, and high definition"));
        assert!(!text.contains("CRITICAL INSTRUCTION"));
        assert!(!text.contains("reference image"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_enhance_prompt_names_reference_count() {
        let text = enhance_prompt("open plan office", 3);
        assert!(text.contains("The user has provided 3 reference image(s)"));
        assert!(text.contains("strict visual inspiration"));
        assert!(text.contains("high definition"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_enhance_prompt_keeps_user_placeholders_verbatim() {
        let prompt = "sign reading {{reference_clause}} and {{count}} on wall";

        let text = enhance_prompt(prompt, 0);
        assert!(text.contains(&format!("User Request: {}", prompt)));
        assert!(!text.contains("CRITICAL INSTRUCTION"));

        let text = enhance_prompt(prompt, 2);
        assert!(text.contains(&format!("User Request: {}", prompt)));
        assert_eq!(text.matches("CRITICAL INSTRUCTION").count(), 1);
    }

    #[test]
    fn test_random_sample_prompt_is_a_known_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let prompt = random_sample_prompt(&mut rng);
            assert!(SAMPLE_PROMPTS.lines().any(|line| line == prompt));
            assert!(!prompt.is_empty());
        }
    }
}
