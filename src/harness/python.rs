use super::kind::{OutputShape, ProblemKind, GENERIC_PLACEHOLDER};

const PREAMBLE: &str = "import sys\nimport json\nfrom typing import List, Optional\n\n";

const LIST_NODE: &str = r#"class ListNode:
    def __init__(self, val=0, next=None):
        self.val = val
        self.next = next

"#;

const ARRAY_HELPERS: &str = r#"def parse_int_array(line):
    if line.startswith('[') and line.endswith(']'):
        line = line[1:-1]
    if not line.strip():
        return []
    return [int(x.strip()) for x in line.split(',')]

def print_int_array(arr):
    print('[' + ','.join(map(str, arr)) + ']')

"#;

const LIST_HELPERS: &str = r#"def parse_linked_list(line):
    values = parse_int_array(line)
    if not values:
        return None
    head = ListNode(values[0])
    current = head
    for val in values[1:]:
        current.next = ListNode(val)
        current = current.next
    return head

def print_linked_list(head):
    result = []
    current = head
    while current:
        result.append(current.val)
        current = current.next
    print_int_array(result)

"#;

pub fn wrap(source: &str, kind: ProblemKind) -> String {
    let descriptor = kind.descriptor();
    let mut program = String::from(PREAMBLE);

    if kind.uses_linked_list() {
        program.push_str(LIST_NODE);
    }

    program.push_str(source);
    program.push_str("\n\n");

    program.push_str(ARRAY_HELPERS);
    if kind.uses_linked_list() {
        program.push_str(LIST_HELPERS);
    }

    program.push_str("def main():\n");
    program.push_str("    try:\n");
    program.push_str("        solution = Solution()\n");
    program.push_str("        line = sys.stdin.readline().strip()\n");

    match descriptor.output {
        OutputShape::IntArray => {
            program.push_str("        nums = parse_int_array(line)\n");
            program.push_str("        target_line = sys.stdin.readline().strip()\n");
            program.push_str("        target = int(target_line) if target_line else 0\n");
            program.push_str(&format!(
                "        result = solution.{}(nums, target)\n",
                descriptor.entry_method
            ));
            program.push_str("        print_int_array(result)\n");
        }
        OutputShape::LinkedList => {
            program.push_str("        head = parse_linked_list(line)\n");
            program.push_str(&format!(
                "        result = solution.{}(head)\n",
                descriptor.entry_method
            ));
            program.push_str("        print_linked_list(result)\n");
        }
        OutputShape::Placeholder => {
            program.push_str("        if line.startswith('[') and line.endswith(']'):\n");
            program.push_str("            parse_int_array(line)\n");
            program.push_str(&format!("        print('{}')\n", GENERIC_PLACEHOLDER));
        }
    }

    program.push_str("    except Exception as e:\n");
    program.push_str("        print(f'Error: {str(e)}', file=sys.stderr)\n");
    program.push_str("        import traceback\n");
    program.push_str("        traceback.print_exc()\n");
    program.push_str("        sys.exit(1)\n");
    program.push('\n');
    program.push_str("if __name__ == '__main__':\n");
    program.push_str("    main()\n");
    program
}
