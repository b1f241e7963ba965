/// The three artifacts a critic is asked to judge
#[derive(Debug, Clone, Copy)]
pub struct StrategySubmission<'a> {
    pub prompt: &'a str,
    pub strategy_output: &'a str,
    pub code: &'a str,
}

/// Prompt templates for the critic
pub struct CriticPrompts;

impl CriticPrompts {
    /// Build the evaluation prompt. Identical for every critic model.
    pub fn build_prompt(submission: StrategySubmission<'_>) -> String {
        format!(
            r#"You are a critic agent. Your job is to check whether a generated trading strategy fully and correctly implements the user's original request.

## Your Task
1. Judge whether the generated strategy and its code fully and correctly implement EVERY requirement in the user request.
2. Be strict: flag even small missing or incorrect requirements.
3. If the strategy is complete, explain briefly why.
4. If it is not, give detailed reasoning that points out the specific gaps, mistakes, or mismatches.

## User Request (Prompt)
{prompt}

## Generated Strategy
{strategy_output}

## Code
```
{code}
```

---

## Required Response Format

Provide your detailed reasoning first. Then end your response with a final line containing exactly "Yes" (every requirement is met) or "No" (anything is missing or wrong). Do not use JSON and do not add anything after that line."#,
            prompt = submission.prompt,
            strategy_output = submission.strategy_output,
            code = submission.code,
        )
    }
}
