// src/services/prompt.rs

/// Builds the instruction sent to the generation service.
///
/// `text` and `count` are embedded verbatim. When `seen_questions` is not
/// empty the prompt lists them and forbids repeating or paraphrasing them;
/// otherwise that clause is left out. Callers gate on non-empty `text`.
pub fn build_prompt(text: &str, count: u32, seen_questions: &[String]) -> String {
    let mut prompt = format!(
        "You are a tutor writing a multiple-choice quiz from a student's study notes.\n\
         Write exactly {count} unique multiple-choice questions based on the text below. \
         Each question must cover a distinct idea from the text and must not overlap with the others.\n\
         \n\
         For every question provide these fields:\n\
         - \"question\": the question text\n\
         - \"choices\": an array of exactly four answer options, without \"A)\"-style labels\n\
         - \"answer\": the single letter (A, B, C or D) of the correct option\n\
         - \"explanation\": a short explanation of why the answer is correct\n\
         - \"excerpt\": a short quote from the text that supports the answer\n\
         - \"category\": a short topic label for the question\n"
    );

    if !seen_questions.is_empty() {
        let quoted: Vec<String> = seen_questions.iter().map(|q| format!("\"{}\"", q)).collect();
        prompt.push_str(&format!(
            "\nThese questions were already asked: {}. Do not repeat or paraphrase any of them.\n",
            quoted.join(", ")
        ));
    }

    prompt.push_str(&format!(
        "\nRespond with only a JSON array of question objects and no other commentary.\n\
         \n\
         Text:\n{text}\n"
    ));

    prompt
}
