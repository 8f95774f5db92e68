//! System prompt templates for the agent loops.
//!
//! The templates fix the tag protocol the loops parse: `<tools>` carries tool
//! signatures, `<tool_call>` carries one JSON call object, `<observation>`
//! carries results, `<thought>` is free reasoning and `<response>` ends a loop.

/// Tag wrapping the user's question in a ReAct conversation.
pub const QUESTION_TAG: &str = "question";
/// Tag wrapping serialized tool results.
pub const OBSERVATION_TAG: &str = "observation";
/// Tag wrapping a single tool call object.
pub const TOOL_CALL_TAG: &str = "tool_call";
/// Tag wrapping the model's reasoning.
pub const THOUGHT_TAG: &str = "thought";
/// Terminal tag: its content is the loop's final answer.
pub const RESPONSE_TAG: &str = "response";

/// Marker a critic emits when the draft needs no further revision.
pub const REFLECTION_STOP_MARKER: &str = "<OK>";

const REACT_SYSTEM_PROMPT: &str = r#"
You work in a loop of Thought, Action and Observation steps.
Function signatures are listed inside <tools></tools> XML tags.
You may call one or more functions to help answer the user query. Do not guess the values to pass
to a function. Respect the declared type of every property.

For every function call output one JSON object with the function name, its arguments and a
monotonically increasing id inside <tool_call></tool_call> XML tags:

<tool_call>
{"name": <function-name>, "arguments": <args-object>, "id": <monotonically-increasing-id>}
</tool_call>

Available tools:

<tools>
{tools}
</tools>

Example session:

<question>What's the current temperature in Madrid?</question>
<thought>I need the current weather in Madrid</thought>
<tool_call>{"name": "get_current_weather", "arguments": {"location": "Madrid", "unit": "celsius"}, "id": 0}</tool_call>

You will be called again with:

<observation>{"0": {"temperature": 25, "unit": "celsius"}}</observation>

You then output:

<response>The current temperature in Madrid is 25 degrees Celsius</response>

Additional constraints:

- If the user asks something unrelated to the tools above, answer freely inside <response></response> tags.
"#;

const TOOL_SYSTEM_PROMPT: &str = r#"
You are a function calling model. Function signatures are listed inside <tools></tools> XML tags.
You may call one or more functions to help answer the user query. Do not guess the values to pass
to a function. Respect the declared type of every property.

For every function call output one JSON object with the function name, its arguments and a
monotonically increasing id inside <tool_call></tool_call> XML tags:

<tool_call>
{"name": <function-name>, "arguments": <args-object>, "id": <monotonically-increasing-id>}
</tool_call>

Available tools:

<tools>
{tools}
</tools>
"#;

/// Appended to every generation system prompt.
pub const BASE_GENERATION_SYSTEM_PROMPT: &str = r#"
Your task is to generate the best content possible for the user's request.
If the user provides critique, respond with a revised version of your previous attempt.
You must always output the revised content.
"#;

/// Appended to every reflection system prompt.
pub const BASE_REFLECTION_SYSTEM_PROMPT: &str = r#"
You are tasked with generating critique and recommendations for the user's generated content.
If the content has something wrong or something to improve, output a list of recommendations
and critiques. If the content is fine and there is nothing to change, output this: <OK>
"#;

/// System prompt for the ReAct loop: the caller's prompt followed by the
/// protocol description with every tool signature inlined.
pub fn react_system_prompt(base: &str, tool_signatures: &str) -> String {
    format!(
        "{}\n{}",
        base,
        REACT_SYSTEM_PROMPT.replace("{tools}", tool_signatures)
    )
}

/// System prompt for the one-shot tool agent.
pub fn tool_system_prompt(tool_signatures: &str) -> String {
    TOOL_SYSTEM_PROMPT.replace("{tools}", tool_signatures)
}

/// Prompt handed to an agent node: its task, the expected output and the
/// labelled outputs of the nodes it depends on.
pub fn agent_task_prompt(task_description: &str, expected_output: &str, context: &str) -> String {
    format!(
        "You are an AI agent. You are part of a team of agents working together to complete a task.\n\
         I'm going to give you the task description enclosed in <task_description></task_description> tags. \
         I'll also give you the available context from the other agents in <context></context> tags. \
         If the context is not available, the <context></context> tags will be empty. \
         You'll also receive the task expected output enclosed in <task_expected_output></task_expected_output> tags. \
         With all this information you need to create the best possible response, always respecting the format \
         as described in <task_expected_output></task_expected_output> tags. \
         If expected output is not available, just create a meaningful response to complete the task.\n\n\
         <task_description>\n{task_description}\n</task_description>\n\n\
         <task_expected_output>\n{expected_output}\n</task_expected_output>\n\n\
         <context>\n{context}\n</context>\n\n\
         Your response:"
    )
}
