//! Toolpath filters contributed by the tool subsystem.

use crate::collection::{ToolCollection, ToolError};
use crate::tool::ToolId;

/// A filter applied by the toolpath pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolpathFilter {
    /// Switch the machine to the given tool.
    SelectTool(ToolId),
}

/// Filters needed to cut with the tool identified by `tool_id`.
pub fn toolpath_filters(tools: &ToolCollection, tool_id: ToolId) -> Result<Vec<ToolpathFilter>, ToolError> {
    let tool = tools
        .get_by_tool_id(tool_id)
        .ok_or(ToolError::UnknownToolId(tool_id))?;
    Ok(vec![ToolpathFilter::SelectTool(tool.tool_id)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Tool;

    #[test]
    fn test_known_tool() {
        let mut tools = ToolCollection::new();
        tools.add(Tool::new(4, "flat_bottom"));
        assert_eq!(toolpath_filters(&tools, 4), Ok(vec![ToolpathFilter::SelectTool(4)]));
    }

    #[test]
    fn test_unknown_tool() {
        let tools = ToolCollection::new();
        assert_eq!(toolpath_filters(&tools, 4), Err(ToolError::UnknownToolId(4)));
    }
}
