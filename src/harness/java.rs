//! Java driver: `public class Main` around the user's `Solution` class

use super::kind::{OutputShape, ProblemKind, GENERIC_PLACEHOLDER};

const PREAMBLE: &str = "import java.util.*;\nimport java.io.*;\n\n";

const LIST_NODE: &str = r#"class ListNode {
    int val;
    ListNode next;
    ListNode() {}
    ListNode(int val) { this.val = val; }
    ListNode(int val, ListNode next) { this.val = val; this.next = next; }
}

"#;

const ARRAY_HELPERS: &str = r#"
    private static int[] parseIntArray(String line) {
        if (line.startsWith("[") && line.endsWith("]")) {
            line = line.substring(1, line.length() - 1);
        }
        if (line.trim().isEmpty()) return new int[0];

        String[] parts = line.split(",");
        int[] result = new int[parts.length];
        for (int i = 0; i < parts.length; i++) {
            result[i] = Integer.parseInt(parts[i].trim());
        }
        return result;
    }

    private static void printIntArray(int[] arr) {
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < arr.length; i++) {
            if (i > 0) out.append(",");
            out.append(arr[i]);
        }
        out.append("]");
        System.out.println(out);
    }
"#;

const LIST_HELPERS: &str = r#"
    private static ListNode parseLinkedList(String line) {
        int[] values = parseIntArray(line);
        if (values.length == 0) return null;

        ListNode head = new ListNode(values[0]);
        ListNode current = head;
        for (int i = 1; i < values.length; i++) {
            current.next = new ListNode(values[i]);
            current = current.next;
        }
        return head;
    }

    private static void printLinkedList(ListNode head) {
        StringBuilder out = new StringBuilder("[");
        boolean first = true;
        for (ListNode current = head; current != null; current = current.next) {
            if (!first) out.append(",");
            out.append(current.val);
            first = false;
        }
        out.append("]");
        System.out.println(out);
    }
"#;

pub fn wrap(source: &str, kind: ProblemKind) -> String {
    let descriptor = kind.descriptor();
    let mut program = String::from(PREAMBLE);

    if kind.uses_linked_list() {
        program.push_str(LIST_NODE);
    }

    program.push_str(source);
    program.push_str("\n\n");

    program.push_str("public class Main {\n");
    program.push_str("    public static void main(String[] args) {\n");
    program.push_str("        Scanner scanner = new Scanner(System.in);\n");
    program.push_str("        Solution solution = new Solution();\n\n");
    program.push_str("        try {\n");
    program.push_str(
        "            String line = scanner.hasNextLine() ? scanner.nextLine().trim() : \"\";\n",
    );

    match descriptor.output {
        OutputShape::IntArray => {
            program.push_str("            int[] nums = parseIntArray(line);\n");
            program.push_str("            int target = 0;\n");
            program.push_str("            if (scanner.hasNextLine()) {\n");
            program.push_str("                target = Integer.parseInt(scanner.nextLine().trim());\n");
            program.push_str("            }\n");
            program.push_str(&format!(
                "            int[] result = solution.{}(nums, target);\n",
                descriptor.entry_method
            ));
            program.push_str("            printIntArray(result);\n");
        }
        OutputShape::LinkedList => {
            program.push_str("            ListNode head = parseLinkedList(line);\n");
            program.push_str(&format!(
                "            ListNode result = solution.{}(head);\n",
                descriptor.entry_method
            ));
            program.push_str("            printLinkedList(result);\n");
        }
        OutputShape::Placeholder => {
            program.push_str("            if (line.startsWith(\"[\") && line.endsWith(\"]\")) {\n");
            program.push_str("                parseIntArray(line);\n");
            program.push_str("            }\n");
            program.push_str(&format!(
                "            System.out.println(\"{}\");\n",
                GENERIC_PLACEHOLDER
            ));
        }
    }

    program.push_str("        } catch (Exception e) {\n");
    program.push_str("            System.err.println(\"Error: \" + e.getMessage());\n");
    program.push_str("            e.printStackTrace();\n");
    program.push_str("            System.exit(1);\n");
    program.push_str("        } finally {\n");
    program.push_str("            scanner.close();\n");
    program.push_str("        }\n");
    program.push_str("    }\n");

    program.push_str(ARRAY_HELPERS);
    if kind.uses_linked_list() {
        program.push_str(LIST_HELPERS);
    }

    program.push_str("}\n");
    program
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "class Solution {\n    public int[] twoSum(int[] nums, int target) { return new int[0]; }\n}";

    #[test]
    fn test_two_sum_driver() {
        let program = wrap(USER, ProblemKind::TwoSum);

        assert!(program.starts_with("import java.util.*;"));
        assert!(program.contains(USER));
        assert!(program.contains("int[] result = solution.twoSum(nums, target);"));
        assert!(program.contains("printIntArray(result);"));
        assert!(!program.contains("class ListNode"));
    }

    #[test]
    fn test_linked_list_driver_declares_node_before_user_code() {
        let program = wrap("class Solution {}", ProblemKind::ReverseLinkedList);

        let node = program.find("class ListNode").unwrap();
        let user = program.find("class Solution").unwrap();
        assert!(node < user);
        assert!(program.contains("ListNode result = solution.reverseList(head);"));
        assert!(program.contains("private static void printLinkedList"));
    }

    #[test]
    fn test_generic_driver_prints_placeholder() {
        let program = wrap("class Solution {}", ProblemKind::Generic);
        assert!(program.contains("System.out.println(\"Generic input processed\");"));
        assert!(!program.contains("solution.twoSum"));
    }
}
