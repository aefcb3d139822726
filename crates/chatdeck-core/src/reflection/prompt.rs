/// Critique instruction sent after the content in every refinement round.
///
/// `round` is the history index being produced (`round_1` is the first
/// refinement). The text shows it 1-indexed over all rounds, so `round_0`
/// counts as the first round and `round_1` is announced as round 2.
pub fn critique_prompt(round: usize) -> String {
    format!(
        "This is optimization round {}. Improve the content along these directions:\n\
         1. Depth: add expert viewpoints, supporting data, and research findings.\n\
         2. Examples: add relevant cases and real-world application scenarios.\n\
         3. Structure: reorganize the content so the logic is clearer.\n\
         4. Expression: polish the language so the content is more vivid.\n\
         \n\
         Optimize the content along the directions above and keep the core topic unchanged.",
        round + 1
    )
}
