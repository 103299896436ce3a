//! `crew tools`

use crew_core::tools::ToolKind;
use crew_mcp::ServerTool;

pub fn list_tools() {
    println!("Agent tools:");
    for kind in ToolKind::ALL {
        println!("  {:<8} {}", kind.as_str(), kind.description());
    }

    println!();
    println!("MCP tools:");
    for tool in ServerTool::ALL {
        println!("  {:<16} {}", tool.as_str(), tool.description());
    }
}
